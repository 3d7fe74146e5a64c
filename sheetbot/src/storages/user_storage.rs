use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use teloxide::types::ChatId;
use tokio::{fs, sync::Mutex};

/// Trait for per-chat registration data
#[async_trait::async_trait]
pub trait UserStorageTrait: Send + Sync {
    /// Spreadsheet bound to a chat, if the chat has registered
    async fn get_spreadsheet_id(&self, chat_id: ChatId) -> Option<String>;

    /// Bind a chat to a spreadsheet, replacing any previous binding
    async fn set_spreadsheet_id(
        &self,
        chat_id: ChatId,
        spreadsheet_id: String,
    ) -> Result<(), std::io::Error>;
}

/// Serializable per-chat data that can be saved/loaded as YAML
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub spreadsheet_id: Option<String>,
}

type UserStorageData = Arc<Mutex<HashMap<ChatId, UserData>>>;

/// In-memory storage of chat registrations
#[derive(Clone)]
pub struct UserStorage {
    data: UserStorageData,
}

impl UserStorage {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn get(&self, chat_id: ChatId) -> Option<UserData> {
        self.data.lock().await.get(&chat_id).cloned()
    }

    async fn replace(&self, chat_id: ChatId, user: UserData) {
        self.data.lock().await.insert(chat_id, user);
    }
}

impl Default for UserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStorageTrait for UserStorage {
    async fn get_spreadsheet_id(&self, chat_id: ChatId) -> Option<String> {
        self.get(chat_id).await.and_then(|user| user.spreadsheet_id)
    }

    async fn set_spreadsheet_id(
        &self,
        chat_id: ChatId,
        spreadsheet_id: String,
    ) -> Result<(), std::io::Error> {
        let mut storage_guard = self.data.lock().await;
        storage_guard.entry(chat_id).or_default().spreadsheet_id = Some(spreadsheet_id);
        Ok(())
    }
}

/// Persistent storage that keeps each chat's data in a YAML file named by
/// chat ID, loaded lazily on first access
#[derive(Clone)]
pub struct PersistentUserStorage {
    storage_dir: PathBuf,
    memory_storage: UserStorage,
    // Chats already read from disk
    loaded_chats: Arc<Mutex<HashMap<ChatId, bool>>>,
}

impl PersistentUserStorage {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            storage_dir,
            memory_storage: UserStorage::new(),
            loaded_chats: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn get_file_path(&self, chat_id: ChatId) -> PathBuf {
        self.storage_dir.join(format!("{}.yaml", chat_id))
    }

    /// Read a chat's data; a missing or unreadable file means an unregistered chat
    async fn load_user(&self, chat_id: ChatId) -> UserData {
        let file_path = self.get_file_path(chat_id);
        match fs::read_to_string(&file_path).await {
            Ok(content) => serde_yaml::from_str::<UserData>(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {:?}: {}", file_path, e);
                UserData::default()
            }),
            Err(_) => UserData::default(),
        }
    }

    async fn save_user(&self, chat_id: ChatId, user: &UserData) -> Result<(), std::io::Error> {
        fs::create_dir_all(&self.storage_dir).await?;

        let content = serde_yaml::to_string(user).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize user data to YAML: {}", e),
            )
        })?;
        fs::write(self.get_file_path(chat_id), content).await
    }

    async fn ensure_loaded(&self, chat_id: ChatId) {
        let mut loaded_guard = self.loaded_chats.lock().await;
        if loaded_guard.get(&chat_id).copied().unwrap_or(false) {
            return;
        }
        let user = self.load_user(chat_id).await;
        self.memory_storage.replace(chat_id, user).await;
        loaded_guard.insert(chat_id, true);
    }
}

#[async_trait::async_trait]
impl UserStorageTrait for PersistentUserStorage {
    async fn get_spreadsheet_id(&self, chat_id: ChatId) -> Option<String> {
        self.ensure_loaded(chat_id).await;
        self.memory_storage.get_spreadsheet_id(chat_id).await
    }

    async fn set_spreadsheet_id(
        &self,
        chat_id: ChatId,
        spreadsheet_id: String,
    ) -> Result<(), std::io::Error> {
        self.ensure_loaded(chat_id).await;
        self.memory_storage
            .set_spreadsheet_id(chat_id, spreadsheet_id)
            .await?;

        let user = self.memory_storage.get(chat_id).await.unwrap_or_default();
        self.save_user(chat_id, &user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_registration() {
        let storage = UserStorage::new();
        let chat_id = ChatId(42);
        assert_eq!(storage.get_spreadsheet_id(chat_id).await, None);

        storage
            .set_spreadsheet_id(chat_id, "sheet-a".to_string())
            .await
            .unwrap();
        storage
            .set_spreadsheet_id(chat_id, "sheet-b".to_string())
            .await
            .unwrap();

        assert_eq!(
            storage.get_spreadsheet_id(chat_id).await,
            Some("sheet-b".to_string())
        );
        assert_eq!(storage.get_spreadsheet_id(ChatId(7)).await, None);
    }

    #[tokio::test]
    async fn test_persistent_registration_survives_restart() {
        let dir = temp_dir::TempDir::with_prefix("sheetbot-users").unwrap();
        let chat_id = ChatId(-100123);

        let storage = PersistentUserStorage::new(dir.path().to_path_buf());
        storage
            .set_spreadsheet_id(chat_id, "1AbC_dEf-123".to_string())
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("-100123.yaml")).unwrap();
        assert!(content.contains("spreadsheet_id:"));
        assert!(content.contains("1AbC_dEf-123"));

        let reopened = PersistentUserStorage::new(dir.path().to_path_buf());
        assert_eq!(
            reopened.get_spreadsheet_id(chat_id).await,
            Some("1AbC_dEf-123".to_string())
        );
        assert_eq!(reopened.get_spreadsheet_id(ChatId(1)).await, None);
    }

    #[tokio::test]
    async fn test_malformed_file_is_ignored() {
        let dir = temp_dir::TempDir::with_prefix("sheetbot-users").unwrap();
        std::fs::write(dir.path().join("5.yaml"), "spreadsheet_id: [unclosed").unwrap();

        let storage = PersistentUserStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.get_spreadsheet_id(ChatId(5)).await, None);
    }
}
