//! Account settings: change balance, add, rename, delete, list.

use std::sync::Arc;

use sheetgrid::Account;
use teloxide::prelude::*;

use crate::{
    commands::{format_amount, hide_keyboard, load_accounts, report_error, reply_done, sorted},
    menus::{MenuAction, list_items_keyboard, yes_no_keyboard},
    state::{HandlerResult, MyDialogue, State},
    storages::StorageTrait,
    utils::parse_amount::parse_balance,
};

/// Account list as shown by the "List accounts" button
pub fn format_accounts(accounts: &[Account]) -> String {
    let mut lines: Vec<String> = accounts
        .iter()
        .map(|account| {
            format!(
                "• {}: {}{}",
                account.name,
                format_amount(account.balance),
                if account.is_savings { " (savings)" } else { "" }
            )
        })
        .collect();
    let total: f64 = accounts.iter().map(|account| account.balance).sum();
    lines.push(format!("\nTotal: {}", format_amount(total)));
    lines.join("\n")
}

/// First step of an account menu action
pub async fn start_action(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    action: MenuAction,
) -> HandlerResult {
    if action == MenuAction::AddAccount {
        bot.send_message(
            chat_id,
            "Send me the name of the new account.\n\nType `cancel` to stop.",
        )
        .await?;
        dialogue.update(State::ReceiveNewAccountName).await?;
        return Ok(());
    }

    let Some(accounts) = load_accounts(bot, dialogue, chat_id, storage).await? else {
        return Ok(());
    };
    if accounts.accounts().is_empty() {
        dialogue.exit().await?;
        reply_done(bot, chat_id, "You don't have any accounts yet.").await?;
        return Ok(());
    }

    let names = sorted(accounts.names());
    let (question, next) = match action {
        MenuAction::ChangeBalance => (
            "Which account's balance do you want to change?",
            State::ReceiveBalanceAccount,
        ),
        MenuAction::RenameAccount => (
            "Which account do you want to rename?",
            State::ReceiveAccountToRename,
        ),
        MenuAction::DeleteAccount => (
            "Which account do you want to delete?",
            State::ReceiveAccountToDelete,
        ),
        _ => {
            dialogue.exit().await?;
            reply_done(bot, chat_id, format_accounts(accounts.accounts())).await?;
            return Ok(());
        }
    };
    bot.send_message(chat_id, question)
        .reply_markup(list_items_keyboard(&names))
        .await?;
    dialogue.update(next).await?;
    Ok(())
}

/// Resolve the account the user picked from the list; re-prompts on unknown names
async fn pick_account(
    bot: &Bot,
    dialogue: &MyDialogue,
    msg: &Message,
    storage: &Arc<dyn StorageTrait>,
) -> Result<Option<Account>, crate::state::HandlerError> {
    let Some(accounts) = load_accounts(bot, dialogue, msg.chat.id, storage).await? else {
        return Ok(None);
    };
    let text = msg.text().unwrap_or_default();
    match accounts.get(text) {
        Some(account) => Ok(Some(account.clone())),
        None => {
            log::warn!("Unknown account {:?} in chat {}", text, msg.chat.id);
            bot.send_message(msg.chat.id, "I don't know this account, try again!")
                .reply_markup(list_items_keyboard(&sorted(accounts.names())))
                .await?;
            Ok(None)
        }
    }
}

pub async fn receive_balance_account(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(account) = pick_account(&bot, &dialogue, &msg, &storage).await? else {
        return Ok(());
    };
    bot.send_message(
        msg.chat.id,
        format!(
            "The balance of {} is {}. Enter the new balance.",
            account.name,
            format_amount(account.balance)
        ),
    )
    .reply_markup(hide_keyboard())
    .await?;
    dialogue
        .update(State::ReceiveNewBalance {
            account: account.name,
        })
        .await?;
    Ok(())
}

pub async fn receive_new_balance(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    account: String,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let balance = match parse_balance(msg.text().unwrap_or_default()) {
        Ok(balance) => balance,
        Err(reason) => {
            bot.send_message(msg.chat.id, reason).await?;
            return Ok(());
        }
    };
    let Some(mut accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    dialogue.exit().await?;
    match accounts.set_balance(&account, balance).await {
        Ok(account) => {
            reply_done(
                &bot,
                msg.chat.id,
                format!(
                    "The balance of {} is now {} ✅",
                    account.name,
                    format_amount(account.balance)
                ),
            )
            .await?
        }
        Err(err) => report_error(&bot, msg.chat.id, &err).await?,
    }
    Ok(())
}

pub async fn receive_new_account_name(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let name = msg.text().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        bot.send_message(msg.chat.id, "The name can't be empty, send it again.")
            .await?;
        return Ok(());
    }
    let Some(accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    if let Some(existing) = accounts.get(&name) {
        bot.send_message(
            msg.chat.id,
            format!("Account {} already exists, choose another name.", existing.name),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "What is the current balance of this account?")
        .await?;
    dialogue
        .update(State::ReceiveNewAccountBalance { name })
        .await?;
    Ok(())
}

pub async fn receive_new_account_balance(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    name: String,
) -> HandlerResult {
    let balance = match parse_balance(msg.text().unwrap_or_default()) {
        Ok(balance) => balance,
        Err(reason) => {
            bot.send_message(msg.chat.id, reason).await?;
            return Ok(());
        }
    };
    bot.send_message(msg.chat.id, "Is it a savings account?")
        .reply_markup(yes_no_keyboard())
        .await?;
    dialogue
        .update(State::ReceiveNewAccountSavings { name, balance })
        .await?;
    Ok(())
}

/// Last step of adding an account, after the savings question
pub async fn create_account(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    name: String,
    balance: f64,
    is_savings: bool,
) -> HandlerResult {
    let Some(mut accounts) = load_accounts(bot, dialogue, chat_id, storage).await? else {
        return Ok(());
    };
    dialogue.exit().await?;
    match accounts.add(&name, balance, is_savings).await {
        Ok(account) => {
            log::info!("Chat {} added account {}", chat_id, account.name);
            reply_done(
                bot,
                chat_id,
                format!(
                    "Account {} with balance {} was added ✅",
                    account.name,
                    format_amount(account.balance)
                ),
            )
            .await?
        }
        Err(err) => report_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

pub async fn receive_account_to_rename(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(account) = pick_account(&bot, &dialogue, &msg, &storage).await? else {
        return Ok(());
    };
    bot.send_message(
        msg.chat.id,
        format!("Send me the new name for {}.", account.name),
    )
    .reply_markup(hide_keyboard())
    .await?;
    dialogue
        .update(State::ReceiveAccountNewName {
            account: account.name,
        })
        .await?;
    Ok(())
}

pub async fn receive_account_new_name(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    account: String,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let new_name = msg.text().unwrap_or_default().to_string();
    let Some(mut accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    dialogue.exit().await?;
    match accounts.rename(&account, &new_name).await {
        Ok(renamed) => {
            reply_done(
                &bot,
                msg.chat.id,
                format!("Account {} is now called {} ✅", account, renamed.name),
            )
            .await?
        }
        Err(err) => report_error(&bot, msg.chat.id, &err).await?,
    }
    Ok(())
}

pub async fn receive_account_to_delete(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(account) = pick_account(&bot, &dialogue, &msg, &storage).await? else {
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Got it.")
        .reply_markup(hide_keyboard())
        .await?;
    bot.send_message(
        msg.chat.id,
        format!(
            "Delete account {} with balance {}? Its row is removed from the sheet.",
            account.name,
            format_amount(account.balance)
        ),
    )
    .reply_markup(yes_no_keyboard())
    .await?;
    dialogue
        .update(State::ConfirmAccountDelete {
            account: account.name,
        })
        .await?;
    Ok(())
}

pub async fn confirm_delete(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
    account: String,
    confirmed: bool,
) -> HandlerResult {
    if !confirmed {
        dialogue.exit().await?;
        reply_done(bot, chat_id, format!("Account {} was kept.", account)).await?;
        return Ok(());
    }
    let Some(mut accounts) = load_accounts(bot, dialogue, chat_id, storage).await? else {
        return Ok(());
    };
    dialogue.exit().await?;
    match accounts.delete(&account).await {
        Ok(deleted) => {
            log::info!("Chat {} deleted account {}", chat_id, deleted.name);
            reply_done(bot, chat_id, format!("Account {} was deleted 🗑", deleted.name)).await?
        }
        Err(err) => report_error(bot, chat_id, &err).await?,
    }
    Ok(())
}
