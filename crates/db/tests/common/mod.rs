//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use estate_core::error::CoreError;
use estate_core::storage::{FileContent, FileStore};
use estate_core::types::{DbId, Money};
use estate_db::models::owner::CreateOwner;
use estate_db::models::property::CreateProperty;
use estate_db::PropertyRepository;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// In-memory file store recording every write.
#[derive(Default)]
pub struct RecordingFileStore {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingFileStore {
    /// Names written so far, in order.
    pub fn names(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b.clone())
    }
}

impl FileStore for RecordingFileStore {
    async fn save(&self, content: &FileContent, name: &str) -> Result<String, CoreError> {
        let bytes = content.decode()?.into_owned();
        self.saved.lock().unwrap().push((name.to_string(), bytes));
        Ok(format!("mem://{name}"))
    }
}

/// File store whose writes always fail with an I/O error.
pub struct FailingFileStore;

impl FileStore for FailingFileStore {
    async fn save(&self, _content: &FileContent, _name: &str) -> Result<String, CoreError> {
        Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

pub fn repo(pool: &PgPool) -> PropertyRepository<RecordingFileStore> {
    PropertyRepository::new(pool.clone(), RecordingFileStore::default())
}

pub fn token() -> CancellationToken {
    CancellationToken::new()
}

pub fn new_owner(name: &str) -> CreateOwner {
    CreateOwner {
        name: name.to_string(),
        address: Some("Calle 10 # 20-30".to_string()),
        photo: Some(FileContent::Bytes(b"\xFF\xD8\xFFjpeg".to_vec())),
        birthday: chrono::NaiveDate::from_ymd_opt(1985, 4, 12),
    }
}

pub fn new_property(code: &str, owner_id: DbId, price: i64) -> CreateProperty {
    CreateProperty {
        name: format!("Property {code}"),
        address: format!("Avenida {code}"),
        price: Money::from(price),
        code_internal: code.to_string(),
        year: 2001,
        owner_id,
    }
}

/// Create an owner and return its id.
pub async fn seed_owner<S: FileStore>(repo: &PropertyRepository<S>, name: &str) -> DbId {
    let mut owner = new_owner(name);
    owner.photo = None;
    repo.create_owner(&owner, &token()).await.unwrap()
}

/// Create a property and return its id.
pub async fn seed_property<S: FileStore>(
    repo: &PropertyRepository<S>,
    code: &str,
    owner_id: DbId,
    price: i64,
) -> DbId {
    repo.create_property(&new_property(code, owner_id, price), &token())
        .await
        .unwrap()
}
