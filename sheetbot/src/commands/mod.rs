pub mod accounts;
pub mod categories;
pub mod entry;
pub mod registration;
pub mod settings;
pub mod transfer;

use std::sync::Arc;

use sheetgrid::{AccountsSheet, CategoriesSheet, GridError, Workbook};
use teloxide::{prelude::*, types::ReplyMarkup, utils::command::BotCommands};

use crate::{
    menus::{main_keyboard, register_keyboard},
    state::{HandlerError, MyDialogue},
    storages::StorageTrait,
};

/// Bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "snake_case",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "display this help")]
    Help,
    #[command(description = "connect your Google Sheet")]
    Register,
    #[command(description = "record an expense")]
    AddExpense,
    #[command(description = "record an income")]
    AddIncome,
    #[command(description = "move money between accounts")]
    Transfer,
    #[command(description = "manage accounts and categories")]
    Settings,
    #[command(description = "stop the current action")]
    Cancel,
}

/// Open the spreadsheet registered for a chat. Unregistered chats and
/// unreachable spreadsheets are answered here and yield `None`.
pub async fn open_workbook(
    bot: &Bot,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
) -> ResponseResult<Option<Workbook>> {
    let Some(spreadsheet_id) = storage
        .clone()
        .as_user_storage()
        .get_spreadsheet_id(chat_id)
        .await
    else {
        log::info!("Chat {} is not registered", chat_id);
        bot.send_message(
            chat_id,
            "You haven't connected a Google Sheet yet. Press /register to do it.",
        )
        .reply_markup(register_keyboard())
        .await?;
        return Ok(None);
    };

    match storage
        .clone()
        .as_workbook_provider()
        .open(&spreadsheet_id)
        .await
    {
        Ok(workbook) => Ok(Some(workbook)),
        Err(err) => {
            report_error(bot, chat_id, &err).await?;
            Ok(None)
        }
    }
}

/// Accounts of the chat's workbook, or `None` after reporting the failure
pub async fn load_accounts(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
) -> Result<Option<AccountsSheet>, HandlerError> {
    let Some(workbook) = open_workbook(bot, chat_id, storage).await? else {
        dialogue.exit().await?;
        return Ok(None);
    };
    match workbook.accounts().await {
        Ok(accounts) => Ok(Some(accounts)),
        Err(err) => {
            dialogue.exit().await?;
            report_error(bot, chat_id, &err).await?;
            Ok(None)
        }
    }
}

/// Categories of the chat's workbook, or `None` after reporting the failure
pub async fn load_categories(
    bot: &Bot,
    dialogue: &MyDialogue,
    chat_id: ChatId,
    storage: &Arc<dyn StorageTrait>,
) -> Result<Option<CategoriesSheet>, HandlerError> {
    let Some(workbook) = open_workbook(bot, chat_id, storage).await? else {
        dialogue.exit().await?;
        return Ok(None);
    };
    match workbook.categories().await {
        Ok(categories) => Ok(Some(categories)),
        Err(err) => {
            dialogue.exit().await?;
            report_error(bot, chat_id, &err).await?;
            Ok(None)
        }
    }
}

/// Tell the user a sheet operation failed
pub async fn report_error(bot: &Bot, chat_id: ChatId, err: &GridError) -> ResponseResult<()> {
    match err {
        GridError::NotFound(_) | GridError::AlreadyExists(_) | GridError::Invalid(_) => {
            log::warn!("Rejected sheet operation in chat {}: {}", chat_id, err);
        }
        _ => log::error!("Sheet operation failed in chat {}: {}", chat_id, err),
    }
    bot.send_message(chat_id, format!("❌ {}", err))
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

/// Send a message and put the main keyboard back
pub async fn reply_done(bot: &Bot, chat_id: ChatId, text: impl Into<String>) -> ResponseResult<()> {
    bot.send_message(chat_id, text)
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

/// Names sorted for a pick list
pub fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort_by_key(|name| name.to_lowercase());
    names
}

pub fn hide_keyboard() -> ReplyMarkup {
    ReplyMarkup::kb_remove()
}

/// Money as shown in replies
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
