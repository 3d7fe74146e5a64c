mod action;
pub mod keyboards;

pub use action::MenuAction;
pub use keyboards::{
    accounts_menu, categories_menu, category_kind_menu, list_items_keyboard, main_keyboard,
    register_keyboard, settings_menu, skip_keyboard, yes_no_keyboard,
};
