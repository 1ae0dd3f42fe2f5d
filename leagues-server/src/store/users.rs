use std::io;
use std::path::{Path, PathBuf};

use leagues_api::auth::Role;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::auth::password_hash;
use crate::Error;

/// The on-disk layout of the credential file: a single `users` key holding
/// the records. This layout is shared with earlier deployments and must not
/// change.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct UserFile {
    users: Vec<UserRecord>,
}

/// A registered user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// `hex(salt)$hex(sha256(salt || password))`
    pub password: String,
    pub role: Role,
}

impl UserRecord {
    /// Creates a new record with the password hashed.
    pub fn new<T>(username: T, password: &str, role: Role) -> Self
    where
        T: ToString,
    {
        Self {
            username: username.to_string(),
            password: password_hash(password),
            role,
        }
    }
}

/// The credential store.
///
/// All access goes through a single mutex: lookups read the in-memory list,
/// mutations update the list and rewrite the file while still holding the
/// lock. Two concurrent registrations can never drop a record.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: Mutex<Vec<UserRecord>>,
}

impl UserStore {
    /// Opens the credential file at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the file cannot be read or parsed.
    pub async fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();

        let users = match fs::read(&path).await {
            Ok(buf) => serde_json::from_slice::<UserFile>(&buf)?.users,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    /// Returns the record for `username`, if registered.
    pub async fn find(&self, username: &str) -> Option<UserRecord> {
        let users = self.users.lock().await;

        users.iter().find(|user| user.username == username).cloned()
    }

    /// Inserts a new record if the username is free.
    ///
    /// Returns `false` without modifying the store if the username is
    /// already taken.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if persisting the file fails.
    pub async fn insert(&self, user: UserRecord) -> Result<bool, Error> {
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.username == user.username) {
            return Ok(false);
        }

        users.push(user);

        let buf = serde_json::to_vec_pretty(&UserFile {
            users: users.clone(),
        })?;
        fs::write(&self.path, buf).await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use leagues_api::auth::Role;

    use super::{UserFile, UserRecord, UserStore};
    use crate::auth::password_verify;

    #[test]
    fn test_user_file_layout() {
        let file = UserFile {
            users: vec![UserRecord {
                username: "alice".to_owned(),
                password: "00ff$aabb".to_owned(),
                role: Role::Admin,
            }],
        };

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "users": [
                    {"username": "alice", "password": "00ff$aabb", "role": "admin"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_insert_duplicate() {
        let path = std::env::temp_dir().join(format!("leagues-users-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let store = UserStore::open(&path).await.unwrap();

        assert!(store
            .insert(UserRecord::new("alice", "hunter2", Role::Admin))
            .await
            .unwrap());

        // The second registration of the same username is rejected.
        assert!(!store
            .insert(UserRecord::new("alice", "other", Role::Viewer))
            .await
            .unwrap());

        let user = store.find("alice").await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(password_verify("hunter2", &user.password));

        assert!(store.find("bob").await.is_none());

        // The store persisted; a reopened store sees the record.
        let store = UserStore::open(&path).await.unwrap();
        assert!(store.find("alice").await.is_some());

        let _ = std::fs::remove_file(&path);
    }
}
