//! JSON-file backed store.
//!
//! The whole dataset lives in memory and is written back after every
//! mutation as `{"users":[...]}`. The lock is held across the write so two
//! requests in this process never interleave their persists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserChanges};
use crate::repository::{UserRepository, ensure_email_free};

#[derive(Deserialize)]
struct UsersDocument {
    users: Vec<User>,
}

#[derive(Debug)]
pub struct FileUserRepository {
    path: PathBuf,
    users: Mutex<Vec<User>>,
}

impl FileUserRepository {
    /// Load the dataset at `path`, creating an empty file if none exists.
    ///
    /// A file that exists but does not parse is an error; it is never
    /// overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> UserResult<Self> {
        let path = path.into();

        let users = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: UsersDocument = serde_json::from_slice(&bytes).map_err(|e| {
                    UserError::Storage(format!("corrupt users file {}: {}", path.display(), e))
                })?;
                document.users
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Users file not found, creating an empty one");
                write_document(&path, &[]).await?;
                Vec::new()
            }
            Err(e) => {
                return Err(UserError::Storage(format!(
                    "failed to read users file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::info!(path = %path.display(), count = users.len(), "Loaded users file");
        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }
}

/// Write to a sibling temp file, then rename over the target
async fn write_document(path: &Path, users: &[User]) -> UserResult<()> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        users: &'a [User],
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(&Borrowed { users })
        .map_err(|e| UserError::Internal(format!("failed to serialize users: {}", e)))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let mut users = self.users.lock().await;
        ensure_email_free(&users, &input.email, None)?;

        let user = User::new(input);
        let mut next = users.clone();
        next.push(user.clone());

        write_document(&self.path, &next).await?;
        *users = next;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        Ok(self.users.lock().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.has_email(email)).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>> {
        let mut users = self.users.lock().await;

        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            ensure_email_free(&users, email, Some(id))?;
        }

        let mut next = users.clone();
        next[index].apply_changes(changes);
        let updated = next[index].clone();

        write_document(&self.path, &next).await?;
        *users = next;

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.lock().await;

        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };

        let mut next = users.clone();
        next.remove(index);

        write_document(&self.path, &next).await?;
        *users = next;

        tracing::info!(user_id = %id, "Deleted user");
        Ok(true)
    }

    async fn health_check(&self) -> UserResult<()> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada Lovelace".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            bio: Some("Analyst".into()),
            contact: "2025550143".into(),
            module: "analytics".into(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("users.json");

        let repo = FileUserRepository::open(&path).await.unwrap();
        assert!(repo.find_all().await.unwrap().is_empty());

        let contents: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(contents, serde_json::json!({ "users": [] }));
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let (kept, updated_id) = {
            let repo = FileUserRepository::open(&path).await.unwrap();
            let kept = repo.create(new_user("a@x.com")).await.unwrap();
            let gone = repo.create(new_user("b@x.com")).await.unwrap();
            let renamed = repo.create(new_user("c@x.com")).await.unwrap();

            repo.delete(gone.id).await.unwrap();
            repo.update(
                renamed.id,
                UserChanges {
                    name: Some("Grace Hopper".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            (kept, renamed.id)
        };

        let reopened = FileUserRepository::open(&path).await.unwrap();
        let users = reopened.find_all().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0], kept);
        assert_eq!(users[1].id, updated_id);
        assert_eq!(users[1].name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_document_shape_stores_hash_under_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let repo = FileUserRepository::open(&path).await.unwrap();
        let user = repo.create(new_user("a@x.com")).await.unwrap();

        let contents: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let stored = &contents["users"][0];
        assert_eq!(stored["id"], user.id.to_string());
        assert_eq!(stored["password"], "$argon2id$stub");
        assert_eq!(stored["module"], "analytics");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_and_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = FileUserRepository::open(&path).await.unwrap_err();
        assert!(matches!(err, UserError::Storage(ref msg) if msg.contains("corrupt")));
        assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let repo = FileUserRepository::open(&path).await.unwrap();
        repo.create(new_user("a@x.com")).await.unwrap();
        assert!(repo.create(new_user("a@x.com")).await.is_err());

        let reopened = FileUserRepository::open(&path).await.unwrap();
        assert_eq!(reopened.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_update_unknown_id() {
        let dir = TempDir::new().unwrap();
        let repo = FileUserRepository::open(dir.path().join("users.json")).await.unwrap();

        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
        assert!(repo.update(Uuid::new_v4(), UserChanges::default()).await.unwrap().is_none());
    }
}
