use std::sync::Arc;

use sheetgrid::{EntryKind, NewEntry};
use teloxide::prelude::*;

use crate::{
    commands::{accounts, categories, entry::finish_entry, reply_done},
    menus::{
        MenuAction, accounts_menu, categories_menu, category_kind_menu, register_keyboard,
        settings_menu,
    },
    state::{HandlerResult, MyDialogue, State},
    storages::StorageTrait,
};

/// Show the settings menu
pub async fn settings(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    dialogue.exit().await?;
    if storage
        .as_user_storage()
        .get_spreadsheet_id(msg.chat.id)
        .await
        .is_none()
    {
        bot.send_message(
            msg.chat.id,
            "You haven't connected a Google Sheet yet. Press /register to do it.",
        )
        .reply_markup(register_keyboard())
        .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "Settings ⚙\n\nHere you can add new accounts and categories or change the existing ones.",
    )
    .reply_markup(settings_menu())
    .await?;
    Ok(())
}

/// Handle inline button presses
pub async fn handle_callback(
    bot: Bot,
    dialogue: MyDialogue,
    q: CallbackQuery,
    action: MenuAction,
    state: State,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(msg) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    log::info!("Chat {} pressed {}", chat_id, action);

    // The menu is replaced by whatever the button leads to
    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        log::warn!("Failed to delete menu message in chat {}: {}", chat_id, e);
    }

    match action {
        MenuAction::OpenAccounts => {
            bot.send_message(chat_id, "Accounts")
                .reply_markup(accounts_menu())
                .await?;
        }
        MenuAction::OpenCategories => {
            bot.send_message(chat_id, "Which categories do you want to change?")
                .reply_markup(category_kind_menu())
                .await?;
        }
        MenuAction::CategoryKind(kind) => {
            let title = match kind {
                EntryKind::Expense => "Expense categories",
                EntryKind::Income => "Income categories",
            };
            bot.send_message(chat_id, title)
                .reply_markup(categories_menu(kind))
                .await?;
        }
        MenuAction::CloseSettings => {
            dialogue.exit().await?;
            reply_done(&bot, chat_id, "Settings closed.").await?;
        }
        MenuAction::ChangeBalance
        | MenuAction::AddAccount
        | MenuAction::RenameAccount
        | MenuAction::DeleteAccount
        | MenuAction::ListAccounts => {
            accounts::start_action(&bot, &dialogue, chat_id, &storage, action).await?;
        }
        MenuAction::AddCategory(kind)
        | MenuAction::RenameCategory(kind)
        | MenuAction::DeleteCategory(kind)
        | MenuAction::ListCategories(kind) => {
            categories::start_action(&bot, &dialogue, chat_id, &storage, kind, action).await?;
        }
        MenuAction::SkipComment => match state {
            State::ReceiveComment {
                kind,
                category,
                amount,
                account,
            } => {
                let draft = NewEntry {
                    category,
                    amount,
                    account,
                    comment: None,
                };
                finish_entry(&bot, &dialogue, chat_id, &storage, kind, draft).await?;
            }
            _ => stale_button(&bot, chat_id, action).await?,
        },
        MenuAction::Yes | MenuAction::No => {
            let confirmed = action == MenuAction::Yes;
            match state {
                State::ReceiveNewAccountSavings { name, balance } => {
                    accounts::create_account(
                        &bot, &dialogue, chat_id, &storage, name, balance, confirmed,
                    )
                    .await?;
                }
                State::ConfirmAccountDelete { account } => {
                    accounts::confirm_delete(&bot, &dialogue, chat_id, &storage, account, confirmed)
                        .await?;
                }
                State::ConfirmCategoryDelete { kind, category } => {
                    categories::confirm_delete(
                        &bot, &dialogue, chat_id, &storage, kind, category, confirmed,
                    )
                    .await?;
                }
                _ => stale_button(&bot, chat_id, action).await?,
            }
        }
    }
    Ok(())
}

/// A button from a conversation that has already ended
async fn stale_button(bot: &Bot, chat_id: ChatId, action: MenuAction) -> HandlerResult {
    log::warn!("Chat {} pressed {} outside of its dialogue", chat_id, action);
    reply_done(bot, chat_id, "This button is no longer active.").await?;
    Ok(())
}
