use sheetgrid::EntryKind;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Where a chat is in a multi-step conversation
#[derive(Clone, Default, Debug, PartialEq)]
pub enum State {
    #[default]
    Idle,
    ReceiveSheetLink,

    // Expense / income
    ReceiveCategory {
        kind: EntryKind,
    },
    ReceiveAmount {
        kind: EntryKind,
        category: String,
    },
    ReceiveAccount {
        kind: EntryKind,
        category: String,
        amount: f64,
    },
    ReceiveComment {
        kind: EntryKind,
        category: String,
        amount: f64,
        account: String,
    },

    // Transfer between accounts
    ReceiveTransferSource,
    ReceiveTransferTarget {
        from: String,
    },
    ReceiveTransferAmount {
        from: String,
        to: String,
    },

    // Account settings
    ReceiveBalanceAccount,
    ReceiveNewBalance {
        account: String,
    },
    ReceiveNewAccountName,
    ReceiveNewAccountBalance {
        name: String,
    },
    ReceiveNewAccountSavings {
        name: String,
        balance: f64,
    },
    ReceiveAccountToRename,
    ReceiveAccountNewName {
        account: String,
    },
    ReceiveAccountToDelete,
    ConfirmAccountDelete {
        account: String,
    },

    // Category settings
    ReceiveNewCategory {
        kind: EntryKind,
    },
    ReceiveCategoryToRename {
        kind: EntryKind,
    },
    ReceiveCategoryNewName {
        kind: EntryKind,
        category: String,
    },
    ReceiveCategoryToDelete {
        kind: EntryKind,
    },
    ConfirmCategoryDelete {
        kind: EntryKind,
        category: String,
    },
}
