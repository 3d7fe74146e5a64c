use std::sync::Arc;

use sheetgrid::{MemoryWorkbooks, WorkbookProvider};

use crate::storages::{UserStorage, UserStorageTrait};

/// Combined storage trait that provides all storage operations
/// This trait allows converting to specific trait objects for functions that only need subset of functionality
pub trait StorageTrait: Send + Sync {
    /// Convert to UserStorageTrait trait object
    fn as_user_storage(self: Arc<Self>) -> Arc<dyn UserStorageTrait>;

    /// Convert to WorkbookProvider trait object
    fn as_workbook_provider(self: Arc<Self>) -> Arc<dyn WorkbookProvider>;
}

/// Main storage structure: chat registrations plus access to the spreadsheets
#[derive(Clone)]
pub struct Storage {
    users: Arc<dyn UserStorageTrait>,
    workbooks: Arc<dyn WorkbookProvider>,
}

impl Storage {
    /// In-memory registrations and in-memory spreadsheets
    pub fn new() -> Self {
        Self {
            users: Arc::new(UserStorage::new()),
            workbooks: Arc::new(MemoryWorkbooks::new()),
        }
    }

    /// Builder-like method to configure user storage
    pub fn users_storage(mut self, storage: impl UserStorageTrait + 'static) -> Self {
        self.users = Arc::new(storage);
        self
    }

    /// Builder-like method to configure where spreadsheets are opened
    pub fn workbook_provider(mut self, provider: impl WorkbookProvider + 'static) -> Self {
        self.workbooks = Arc::new(provider);
        self
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageTrait for Storage {
    fn as_user_storage(self: Arc<Self>) -> Arc<dyn UserStorageTrait> {
        self.users.clone()
    }

    fn as_workbook_provider(self: Arc<Self>) -> Arc<dyn WorkbookProvider> {
        self.workbooks.clone()
    }
}
