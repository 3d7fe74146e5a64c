//! Recording an expense or an income: category, amount, account, comment.

use std::sync::Arc;

use sheetgrid::{EntryKind, NewEntry};
use teloxide::prelude::*;

use crate::{
    commands::{
        format_amount, hide_keyboard, load_accounts, load_categories, open_workbook,
        report_error, reply_done, sorted,
    },
    menus::{list_items_keyboard, skip_keyboard},
    state::{HandlerResult, MyDialogue, State},
    storages::StorageTrait,
    utils::parse_amount::parse_amount,
};

pub async fn add_expense(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    start_entry(bot, dialogue, msg, storage, EntryKind::Expense).await
}

pub async fn add_income(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    start_entry(bot, dialogue, msg, storage, EntryKind::Income).await
}

async fn start_entry(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
    kind: EntryKind,
) -> HandlerResult {
    let Some(categories) = load_categories(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    let categories = sorted(categories.names(kind));

    if categories.is_empty() {
        dialogue.exit().await?;
        reply_done(
            &bot,
            msg.chat.id,
            format!(
                "Looks like you haven't added any {} categories yet.\n\
                 Add one in /settings → Categories.",
                kind
            ),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "Pick the {} category from the list below your keyboard.\n\n\
             Type `cancel` to stop.",
            kind
        ),
    )
    .reply_markup(list_items_keyboard(&categories))
    .await?;
    dialogue.update(State::ReceiveCategory { kind }).await?;
    Ok(())
}

pub async fn receive_category(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    kind: EntryKind,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(categories) = load_categories(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };

    let text = msg.text().unwrap_or_default();
    let Some(category) = categories.get(kind, text) else {
        log::warn!("Unknown {} category {:?} in chat {}", kind, text, msg.chat.id);
        bot.send_message(msg.chat.id, "I don't know this category, try again!")
            .reply_markup(list_items_keyboard(&sorted(categories.names(kind))))
            .await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, "Now enter the amount.")
        .reply_markup(hide_keyboard())
        .await?;
    dialogue
        .update(State::ReceiveAmount { kind, category })
        .await?;
    Ok(())
}

pub async fn receive_amount(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (kind, category): (EntryKind, String),
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let amount = match parse_amount(msg.text().unwrap_or_default()) {
        Ok(amount) => amount,
        Err(reason) => {
            bot.send_message(msg.chat.id, reason).await?;
            return Ok(());
        }
    };

    let Some(accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    let accounts = sorted(accounts.names());

    if accounts.is_empty() {
        dialogue.exit().await?;
        reply_done(
            &bot,
            msg.chat.id,
            "You haven't created any accounts yet! Add one in /settings → Accounts.",
        )
        .await?;
        return Ok(());
    }

    let question = match kind {
        EntryKind::Expense => "Pick the account the money was spent from.",
        EntryKind::Income => "Pick the account the money went to.",
    };
    bot.send_message(msg.chat.id, question)
        .reply_markup(list_items_keyboard(&accounts))
        .await?;
    dialogue
        .update(State::ReceiveAccount {
            kind,
            category,
            amount,
        })
        .await?;
    Ok(())
}

pub async fn receive_account(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (kind, category, amount): (EntryKind, String, f64),
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };

    let text = msg.text().unwrap_or_default();
    let Some(account) = accounts.get(text).map(|account| account.name.clone()) else {
        log::warn!("Unknown account {:?} in chat {}", text, msg.chat.id);
        bot.send_message(msg.chat.id, "I don't know this account, try again!")
            .reply_markup(list_items_keyboard(&sorted(accounts.names())))
            .await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, "Got it!").reply_markup(hide_keyboard()).await?;
    bot.send_message(
        msg.chat.id,
        "You can also add a comment: just send it to me. \
         If you don't want to, press Skip.",
    )
    .reply_markup(skip_keyboard())
    .await?;
    dialogue
        .update(State::ReceiveComment {
            kind,
            category,
            amount,
            account,
        })
        .await?;
    Ok(())
}

pub async fn receive_comment(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (kind, category, amount, account): (EntryKind, String, f64, String),
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let draft = NewEntry {
        category,
        amount,
        account,
        comment: msg.text().map(str::to_string),
    };
    finish_entry(&bot, &dialogue, msg.chat.id, &storage, kind, draft).await
}

/// Write the entry to the sheet and end the dialogue
pub async fn finish_entry(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    kind: EntryKind,
    draft: NewEntry,
) -> HandlerResult {
    dialogue.exit().await?;
    let Some(workbook) = open_workbook(bot, chat_id, storage).await? else {
        return Ok(());
    };
    match workbook.record(kind, draft).await {
        Ok(entry) => {
            log::info!(
                "Chat {} recorded {} {} {} ({})",
                chat_id,
                kind,
                entry.category,
                entry.amount,
                entry.account
            );
            reply_done(
                bot,
                chat_id,
                format!(
                    "The entry was added to your Google Sheet! ✅\n{}: {} {} ({})",
                    entry.date.format("%d.%m.%Y"),
                    entry.category,
                    format_amount(entry.amount),
                    entry.account
                ),
            )
            .await?;
        }
        Err(err) => report_error(bot, chat_id, &err).await?,
    }
    Ok(())
}
