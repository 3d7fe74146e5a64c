use sheetgrid::EntryKind;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::menus::MenuAction;

pub const EXPENSE_BUTTON: &str = "Expense 📤";
pub const INCOME_BUTTON: &str = "Income 📥";
pub const SETTINGS_BUTTON: &str = "Settings ⚙";
pub const TRANSFER_BUTTON: &str = "Transfer between accounts 💱";

fn button(action: MenuAction, text: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), action.to_string())
}

/// Keyboard offered until the chat connects a spreadsheet
pub fn register_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![vec![KeyboardButton::new("/register")]])
            .resize_keyboard()
            .one_time_keyboard(),
    )
}

/// Keyboard with all money management actions
pub fn main_keyboard() -> ReplyMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new(INCOME_BUTTON),
            KeyboardButton::new(EXPENSE_BUTTON),
        ],
        vec![KeyboardButton::new(SETTINGS_BUTTON)],
        vec![KeyboardButton::new(TRANSFER_BUTTON)],
    ];
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(keyboard)
            .resize_keyboard()
            .one_time_keyboard(),
    )
}

/// One button per item, for picking a category or an account
pub fn list_items_keyboard(items: &[String]) -> ReplyMarkup {
    let keyboard = items
        .iter()
        .map(|item| vec![KeyboardButton::new(item.clone())])
        .collect::<Vec<_>>();
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(keyboard)
            .resize_keyboard()
            .one_time_keyboard(),
    )
}

pub fn skip_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(MenuAction::SkipComment, "Skip")]])
}

pub fn yes_no_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button(MenuAction::Yes, "Yes"),
        button(MenuAction::No, "No"),
    ]])
}

pub fn settings_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(MenuAction::OpenAccounts, "Accounts"),
            button(MenuAction::OpenCategories, "Categories"),
        ],
        vec![button(MenuAction::CloseSettings, "Cancel")],
    ])
}

pub fn accounts_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(MenuAction::ChangeBalance, "Change balance"),
            button(MenuAction::AddAccount, "Add account"),
        ],
        vec![
            button(MenuAction::RenameAccount, "Rename account"),
            button(MenuAction::DeleteAccount, "Delete account"),
        ],
        vec![button(MenuAction::ListAccounts, "List accounts")],
        vec![button(MenuAction::CloseSettings, "Cancel")],
    ])
}

pub fn category_kind_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(MenuAction::CategoryKind(EntryKind::Expense), "Expense categories"),
            button(MenuAction::CategoryKind(EntryKind::Income), "Income categories"),
        ],
        vec![button(MenuAction::CloseSettings, "Cancel")],
    ])
}

pub fn categories_menu(kind: EntryKind) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(MenuAction::AddCategory(kind), "Add category"),
            button(MenuAction::RenameCategory(kind), "Rename category"),
        ],
        vec![
            button(MenuAction::DeleteCategory(kind), "Delete category"),
            button(MenuAction::ListCategories(kind), "List categories"),
        ],
        vec![button(MenuAction::CloseSettings, "Cancel")],
    ])
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_menus_carry_parsable_actions() {
        for markup in [
            settings_menu(),
            accounts_menu(),
            category_kind_menu(),
            categories_menu(EntryKind::Income),
            skip_keyboard(),
            yes_no_keyboard(),
        ] {
            for data in callback_data(&markup) {
                assert!(data.parse::<MenuAction>().is_ok(), "bad callback data {}", data);
            }
        }
    }

    #[test]
    fn test_list_items_keyboard_one_per_row() {
        let items = vec!["Card".to_string(), "Cash".to_string()];
        let ReplyMarkup::Keyboard(markup) = list_items_keyboard(&items) else {
            panic!("Expected reply keyboard");
        };
        assert_eq!(markup.keyboard.len(), 2);
        assert_eq!(markup.keyboard[1][0].text, "Cash");
    }
}
