use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    commands::{
        format_amount, hide_keyboard, load_accounts, open_workbook, report_error, reply_done,
        sorted,
    },
    menus::list_items_keyboard,
    state::{HandlerResult, MyDialogue, State},
    storages::StorageTrait,
    utils::parse_amount::parse_amount,
};

pub async fn start_transfer(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(accounts) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    let accounts = sorted(accounts.names());
    if accounts.len() < 2 {
        dialogue.exit().await?;
        reply_done(
            &bot,
            msg.chat.id,
            "You need at least two accounts to transfer money. Add them in /settings → Accounts.",
        )
        .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "Pick the account to take the money from.\n\nType `cancel` to stop.",
    )
    .reply_markup(list_items_keyboard(&accounts))
    .await?;
    dialogue.update(State::ReceiveTransferSource).await?;
    Ok(())
}

pub async fn receive_transfer_source(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(sheet) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    let accounts = sorted(sheet.names());
    let text = msg.text().unwrap_or_default();
    let Some(from) = sheet.get(text).map(|account| account.name.clone()) else {
        bot.send_message(msg.chat.id, "I don't know this account, try again!")
            .reply_markup(list_items_keyboard(&accounts))
            .await?;
        return Ok(());
    };

    let targets: Vec<String> = accounts.into_iter().filter(|name| *name != from).collect();
    bot.send_message(msg.chat.id, "Now pick the account to put the money to.")
        .reply_markup(list_items_keyboard(&targets))
        .await?;
    dialogue
        .update(State::ReceiveTransferTarget { from })
        .await?;
    Ok(())
}

pub async fn receive_transfer_target(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    from: String,
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let Some(sheet) = load_accounts(&bot, &dialogue, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    let accounts = sorted(sheet.names());
    let to = sheet
        .get(msg.text().unwrap_or_default())
        .map(|account| account.name.clone());
    let targets: Vec<String> = accounts.into_iter().filter(|name| *name != from).collect();
    let Some(to) = to.filter(|to| *to != from) else {
        bot.send_message(msg.chat.id, "Pick one of the other accounts, please.")
            .reply_markup(list_items_keyboard(&targets))
            .await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, "How much do you want to transfer?")
        .reply_markup(hide_keyboard())
        .await?;
    dialogue
        .update(State::ReceiveTransferAmount { from, to })
        .await?;
    Ok(())
}

pub async fn receive_transfer_amount(
    bot: Bot,
    dialogue: MyDialogue,
    msg: Message,
    (from, to): (String, String),
    storage: Arc<dyn StorageTrait>,
) -> HandlerResult {
    let amount = match parse_amount(msg.text().unwrap_or_default()) {
        Ok(amount) if amount > 0.0 => amount,
        Ok(_) => {
            bot.send_message(msg.chat.id, "The amount must be greater than zero")
                .await?;
            return Ok(());
        }
        Err(reason) => {
            bot.send_message(msg.chat.id, reason).await?;
            return Ok(());
        }
    };

    dialogue.exit().await?;
    let Some(workbook) = open_workbook(&bot, msg.chat.id, &storage).await? else {
        return Ok(());
    };
    match workbook.transfer(&from, &to, amount).await {
        Ok((source, target)) => {
            log::info!(
                "Chat {} transferred {} from {} to {}",
                msg.chat.id,
                amount,
                source.name,
                target.name
            );
            reply_done(
                &bot,
                msg.chat.id,
                format!(
                    "Transferred {} ✅\n{}: {}\n{}: {}",
                    format_amount(amount),
                    source.name,
                    format_amount(source.balance),
                    target.name,
                    format_amount(target.balance)
                ),
            )
            .await?;
        }
        Err(err) => report_error(&bot, msg.chat.id, &err).await?,
    }
    Ok(())
}
