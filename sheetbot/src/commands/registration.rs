use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    commands::{Command, reply_done},
    menus::{main_keyboard, register_keyboard},
    state::{HandlerResult, MyDialogue, State},
    storages::StorageTrait,
    utils::sheet_link::extract_spreadsheet_id,
};

/// Greet the user; unregistered chats get the register keyboard
pub async fn start(bot: Bot, msg: Message, storage: Arc<dyn StorageTrait>) -> HandlerResult {
    let registered = storage
        .as_user_storage()
        .get_spreadsheet_id(msg.chat.id)
        .await
        .is_some();

    let greeting = format!(
        "Hi! 🤠 I'm Sheet Bot v{}, I keep track of your expenses and incomes 💰\n\n\
         Everything is stored in a Google Sheet on your own Google Drive, \
         so you always have access to it.",
        env!("CARGO_PKG_VERSION")
    );
    if registered {
        bot.send_message(msg.chat.id, greeting)
            .reply_markup(main_keyboard())
            .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            format!(
                "{}\n\nFirst create a spreadsheet from the template and connect me to it. \
                 Press /register to begin!",
                greeting
            ),
        )
        .reply_markup(register_keyboard())
        .await?;
    }
    Ok(())
}

pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Ask for the spreadsheet link
pub async fn register(bot: Bot, dialogue: MyDialogue, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Share your spreadsheet with the bot's service account as an editor, \
         then send me the link to it.\n\nType `cancel` to stop.",
    )
    .await?;
    dialogue.update(State::ReceiveSheetLink).await?;
    Ok(())
}

/// Validate the link, check the sheet can be opened and bind it to the chat
pub async fn receive_sheet_link(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(spreadsheet_id) = msg.text().and_then(extract_spreadsheet_id) else {
        bot.send_message(
            msg.chat.id,
            "That doesn't look like a Google Sheets link. Send a link like \
             https://docs.google.com/spreadsheets/d/<id>/edit",
        )
        .await?;
        return Ok(());
    };

    if !storage
        .clone()
        .as_workbook_provider()
        .check_access(&spreadsheet_id)
        .await
    {
        bot.send_message(
            msg.chat.id,
            "I can't open this spreadsheet. Make sure it is shared with the bot's \
             service account as an editor and send the link again.",
        )
        .await?;
        return Ok(());
    }

    if let Err(e) = storage
        .as_user_storage()
        .set_spreadsheet_id(msg.chat.id, spreadsheet_id.clone())
        .await
    {
        log::error!("Failed to save registration for chat {}: {}", msg.chat.id, e);
        bot.send_message(msg.chat.id, format!("❌ Failed to save registration: {}", e))
            .await?;
        return Ok(());
    }

    log::info!("Chat {} registered spreadsheet {}", msg.chat.id, spreadsheet_id);
    dialogue.exit().await?;
    reply_done(
        &bot,
        msg.chat.id,
        "Done! Your spreadsheet is connected ✅\nUse the buttons below to record expenses and incomes.",
    )
    .await?;
    Ok(())
}

/// Stop whatever the chat was doing
pub async fn cancel(bot: Bot, dialogue: MyDialogue, msg: Message) -> HandlerResult {
    dialogue.exit().await?;
    reply_done(
        &bot,
        msg.chat.id,
        "Cancelled.\n\nYou can keep tracking your money! 💵",
    )
    .await?;
    Ok(())
}
