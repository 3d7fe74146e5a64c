mod storage;
mod user_storage;

pub use storage::{Storage, StorageTrait};
pub use user_storage::{PersistentUserStorage, UserStorage, UserStorageTrait};
