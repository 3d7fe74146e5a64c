use teloxide::{
    dispatching::{
        UpdateHandler,
        dialogue::{self, InMemStorage},
    },
    prelude::*,
};

use crate::{
    commands::{
        Command, accounts, categories, entry, registration, reply_done,
        settings::{handle_callback, settings},
        transfer,
    },
    menus::{
        MenuAction,
        keyboards::{EXPENSE_BUTTON, INCOME_BUTTON, SETTINGS_BUTTON, TRANSFER_BUTTON},
    },
    state::{HandlerError, HandlerResult, State},
};

/// Build the dispatcher schema: every update enters the chat's dialogue,
/// messages are routed by command or by dialogue state, button presses by
/// their callback data.
pub fn schema() -> UpdateHandler<HandlerError> {
    let message_handler = Update::filter_message()
        .filter(log_message)
        .branch(dptree::filter(is_cancel).endpoint(registration::cancel))
        .branch(teloxide::filter_command::<Command, _>().chain(command_routes()))
        .branch(dptree::filter_map(menu_button).chain(command_routes()))
        .branch(dptree::case![State::ReceiveSheetLink].endpoint(registration::receive_sheet_link))
        // Expense / income
        .branch(dptree::case![State::ReceiveCategory { kind }].endpoint(entry::receive_category))
        .branch(
            dptree::case![State::ReceiveAmount { kind, category }]
                .endpoint(entry::receive_amount),
        )
        .branch(
            dptree::case![State::ReceiveAccount {
                kind,
                category,
                amount
            }]
            .endpoint(entry::receive_account),
        )
        .branch(
            dptree::case![State::ReceiveComment {
                kind,
                category,
                amount,
                account
            }]
            .endpoint(entry::receive_comment),
        )
        // Transfer
        .branch(
            dptree::case![State::ReceiveTransferSource].endpoint(transfer::receive_transfer_source),
        )
        .branch(
            dptree::case![State::ReceiveTransferTarget { from }]
                .endpoint(transfer::receive_transfer_target),
        )
        .branch(
            dptree::case![State::ReceiveTransferAmount { from, to }]
                .endpoint(transfer::receive_transfer_amount),
        )
        // Account settings
        .branch(
            dptree::case![State::ReceiveBalanceAccount].endpoint(accounts::receive_balance_account),
        )
        .branch(
            dptree::case![State::ReceiveNewBalance { account }]
                .endpoint(accounts::receive_new_balance),
        )
        .branch(
            dptree::case![State::ReceiveNewAccountName]
                .endpoint(accounts::receive_new_account_name),
        )
        .branch(
            dptree::case![State::ReceiveNewAccountBalance { name }]
                .endpoint(accounts::receive_new_account_balance),
        )
        .branch(
            dptree::case![State::ReceiveAccountToRename]
                .endpoint(accounts::receive_account_to_rename),
        )
        .branch(
            dptree::case![State::ReceiveAccountNewName { account }]
                .endpoint(accounts::receive_account_new_name),
        )
        .branch(
            dptree::case![State::ReceiveAccountToDelete]
                .endpoint(accounts::receive_account_to_delete),
        )
        // Category settings
        .branch(
            dptree::case![State::ReceiveNewCategory { kind }]
                .endpoint(categories::receive_new_category),
        )
        .branch(
            dptree::case![State::ReceiveCategoryToRename { kind }]
                .endpoint(categories::receive_category_to_rename),
        )
        .branch(
            dptree::case![State::ReceiveCategoryNewName { kind, category }]
                .endpoint(categories::receive_category_new_name),
        )
        .branch(
            dptree::case![State::ReceiveCategoryToDelete { kind }]
                .endpoint(categories::receive_category_to_delete),
        )
        .branch(dptree::endpoint(unexpected_message));

    let callback_handler = Update::filter_callback_query()
        .filter_map(|q: CallbackQuery| {
            q.data
                .as_deref()
                .and_then(|data| data.parse::<MenuAction>().ok())
        })
        .endpoint(handle_callback);

    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .branch(message_handler)
        .branch(callback_handler)
}

fn command_routes() -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(dptree::case![Command::Start].endpoint(registration::start))
        .branch(dptree::case![Command::Help].endpoint(registration::help))
        .branch(dptree::case![Command::Register].endpoint(registration::register))
        .branch(dptree::case![Command::AddExpense].endpoint(entry::add_expense))
        .branch(dptree::case![Command::AddIncome].endpoint(entry::add_income))
        .branch(dptree::case![Command::Transfer].endpoint(transfer::start_transfer))
        .branch(dptree::case![Command::Settings].endpoint(settings))
        .branch(dptree::case![Command::Cancel].endpoint(registration::cancel))
}

/// Log who sent each message; never filters anything out
fn log_message(msg: Message) -> bool {
    match &msg.from {
        Some(user) => log::info!(
            "Message in chat {} from user id={} username={} first_name={}: {:?}",
            msg.chat.id,
            user.id,
            user.username.as_deref().unwrap_or("-"),
            user.first_name,
            msg.text().unwrap_or("<non-text>")
        ),
        None => log::info!("Message in chat {} without sender", msg.chat.id),
    }
    true
}

fn is_cancel(msg: Message) -> bool {
    msg.text()
        .is_some_and(|text| text.trim().eq_ignore_ascii_case("cancel"))
}

/// Main keyboard buttons act as commands
fn menu_button(msg: Message) -> Option<Command> {
    button_command(msg.text()?)
}

fn button_command(text: &str) -> Option<Command> {
    let text = text.trim();
    [
        (EXPENSE_BUTTON, Command::AddExpense),
        (INCOME_BUTTON, Command::AddIncome),
        (SETTINGS_BUTTON, Command::Settings),
        (TRANSFER_BUTTON, Command::Transfer),
    ]
    .into_iter()
    .find(|(button, _)| button.eq_ignore_ascii_case(text))
    .map(|(_, command)| command)
}

/// Text that no dialogue step is waiting for
async fn unexpected_message(bot: Bot, msg: Message, state: State) -> HandlerResult {
    match state {
        State::ReceiveNewAccountSavings { .. }
        | State::ConfirmAccountDelete { .. }
        | State::ConfirmCategoryDelete { .. } => {
            bot.send_message(msg.chat.id, "Please answer with the buttons above.")
                .await?;
        }
        _ => {
            reply_done(
                &bot,
                msg.chat.id,
                "Use the buttons below or /help to see what I can do.",
            )
            .await?;
        }
    }
    Ok(())
}
