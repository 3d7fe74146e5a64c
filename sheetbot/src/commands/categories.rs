//! Category settings for one kind at a time: add, rename, delete, list.

use std::sync::Arc;

use sheetgrid::EntryKind;
use teloxide::prelude::*;

use crate::{
    commands::{hide_keyboard, load_categories, report_error, reply_done, sorted},
    menus::{MenuAction, list_items_keyboard, yes_no_keyboard},
    state::{HandlerError, HandlerResult, MyDialogue, State},
    storages::StorageTrait,
};

/// First step of a category menu action
pub async fn start_action(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    kind: EntryKind,
    action: MenuAction,
) -> HandlerResult {
    if let MenuAction::AddCategory(_) = action {
        bot.send_message(
            chat_id,
            format!(
                "Send me the name of the new {} category.\n\nType `cancel` to stop.",
                kind
            ),
        )
        .await?;
        dialogue.update(State::ReceiveNewCategory { kind }).await?;
        return Ok(());
    }

    let Some(categories) = load_categories(bot, dialogue, chat_id, storage).await? else {
        return Ok(());
    };
    let names = sorted(categories.names(kind));
    if names.is_empty() {
        dialogue.exit().await?;
        reply_done(
            bot,
            chat_id,
            format!("You don't have any {} categories yet.", kind),
        )
        .await?;
        return Ok(());
    }

    let (question, next) = match action {
        MenuAction::RenameCategory(_) => (
            "Which category do you want to rename?",
            State::ReceiveCategoryToRename { kind },
        ),
        MenuAction::DeleteCategory(_) => (
            "Which category do you want to delete?",
            State::ReceiveCategoryToDelete { kind },
        ),
        _ => {
            dialogue.exit().await?;
            let list = names
                .iter()
                .map(|name| format!("• {}", name))
                .collect::<Vec<_>>()
                .join("\n");
            reply_done(bot, chat_id, format!("Your {} categories:\n{}", kind, list)).await?;
            return Ok(());
        }
    };
    bot.send_message(chat_id, question)
        .reply_markup(list_items_keyboard(&names))
        .await?;
    dialogue.update(next).await?;
    Ok(())
}

/// Resolve the category the user picked from the list; re-prompts on unknown names
async fn pick_category(
    bot: &Bot,
    dialogue: &MyDialogue,
    msg: &Message,
    storage: &Arc<dyn StorageTrait>,
    kind: EntryKind,
) -> Result<Option<String>, HandlerError> {
    let Some(categories) = load_categories(bot, dialogue, msg.chat.id, storage).await? else {
        return Ok(None);
    };
    let text = msg.text().unwrap_or_default();
    match categories.get(kind, text) {
        Some(category) => Ok(Some(category)),
        None => {
            log::warn!("Unknown {} category {:?} in chat {}", kind, text, msg.chat.id);
            bot.send_message(msg.chat.id, "I don't know this category, try again!")
                .reply_markup(list_items_keyboard(&sorted(categories.names(kind))))
                .await?;
            Ok(None)
        }
    }
}

pub async fn receive_new_category(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    kind: EntryKind,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let name = msg.text().unwrap_or_default().to_string();
    let Some(mut categories) = load_categories(&bot, &dialogue, msg.chat.id, &storage).await?
    else {
        return Ok(());
    };
    dialogue.exit().await?;
    match categories.add(kind, &name).await {
        Ok(added) => {
            log::info!("Chat {} added {} category {}", msg.chat.id, kind, added);
            reply_done(
                &bot,
                msg.chat.id,
                format!("Category {} was added to {} categories ✅", added, kind),
            )
            .await?
        }
        Err(err) => report_error(&bot, msg.chat.id, &err).await?,
    }
    Ok(())
}

pub async fn receive_category_to_rename(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    kind: EntryKind,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(category) = pick_category(&bot, &dialogue, &msg, &storage, kind).await? else {
        return Ok(());
    };
    bot.send_message(msg.chat.id, format!("Send me the new name for {}.", category))
        .reply_markup(hide_keyboard())
        .await?;
    dialogue
        .update(State::ReceiveCategoryNewName { kind, category })
        .await?;
    Ok(())
}

pub async fn receive_category_new_name(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (kind, category): (EntryKind, String),
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let new_name = msg.text().unwrap_or_default().to_string();
    let Some(mut categories) = load_categories(&bot, &dialogue, msg.chat.id, &storage).await?
    else {
        return Ok(());
    };
    dialogue.exit().await?;
    match categories.rename(kind, &category, &new_name).await {
        Ok(renamed) => {
            reply_done(
                &bot,
                msg.chat.id,
                format!("Category {} is now called {} ✅", category, renamed),
            )
            .await?
        }
        Err(err) => report_error(&bot, msg.chat.id, &err).await?,
    }
    Ok(())
}

pub async fn receive_category_to_delete(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    kind: EntryKind,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(category) = pick_category(&bot, &dialogue, &msg, &storage, kind).await? else {
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Got it.")
        .reply_markup(hide_keyboard())
        .await?;
    bot.send_message(
        msg.chat.id,
        format!("Delete {} category {}?", kind, category),
    )
    .reply_markup(yes_no_keyboard())
    .await?;
    dialogue
        .update(State::ConfirmCategoryDelete { kind, category })
        .await?;
    Ok(())
}

pub async fn confirm_delete(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    kind: EntryKind,
    category: String,
    confirmed: bool,
) -> HandlerResult {
    if !confirmed {
        dialogue.exit().await?;
        reply_done(bot, chat_id, format!("Category {} was kept.", category)).await?;
        return Ok(());
    }
    let Some(mut categories) = load_categories(bot, dialogue, chat_id, storage).await? else {
        return Ok(());
    };
    dialogue.exit().await?;
    match categories.delete(kind, &category).await {
        Ok(deleted) => {
            log::info!("Chat {} deleted {} category {}", chat_id, kind, deleted);
            reply_done(bot, chat_id, format!("Category {} was deleted 🗑", deleted)).await?
        }
        Err(err) => report_error(bot, chat_id, &err).await?,
    }
    Ok(())
}
