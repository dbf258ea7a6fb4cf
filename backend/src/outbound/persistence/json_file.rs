//! Flat-file storage adapter.
//!
//! The whole collection lives in one pretty-printed JSON array. Every read
//! decodes the full file and every write rewrites it in place, matching the
//! original deployment's on-disk format. Writes are not atomic: a crash
//! mid-write can corrupt the file, a documented limitation of this backend.
//! What the adapter does rule out is the lost-update race between
//! overlapping requests: each read-modify-write cycle runs under one
//! process-wide mutex, and the lock is never held across an await point.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserDraft, UserId};

/// [`UserRepository`] backed by a single JSON file.
pub struct JsonFileUserRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileUserRepository {
    /// Create an adapter over `path`. The file is created lazily, holding
    /// an empty array, on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Result<Vec<User>, UserPersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.store(&[])?;
                return Ok(Vec::new());
            }
            Err(err) => return Err(io_error("read", &self.path, &err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            UserPersistenceError::query(format!(
                "{} holds invalid user data: {err}",
                self.path.display()
            ))
        })
    }

    fn store(&self, users: &[User]) -> Result<(), UserPersistenceError> {
        let encoded = serde_json::to_string_pretty(users)
            .map_err(|err| UserPersistenceError::query(format!("failed to encode users: {err}")))?;
        fs::write(&self.path, encoded).map_err(|err| io_error("write", &self.path, &err))
    }
}

fn io_error(action: &str, path: &Path, err: &io::Error) -> UserPersistenceError {
    UserPersistenceError::query(format!("failed to {action} {}: {err}", path.display()))
}

#[async_trait]
impl UserRepository for JsonFileUserRepository {
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let _guard = self.guard();
        self.load()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let _guard = self.guard();
        Ok(self.load()?.into_iter().find(|user| user.id() == id))
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError> {
        let _guard = self.guard();
        let mut users = self.load()?;
        let user = User::new(UserId::random(), draft);
        users.push(user.clone());
        self.store(&users)?;
        Ok(user)
    }

    async fn replace(
        &self,
        id: &UserId,
        draft: UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        let _guard = self.guard();
        let mut users = self.load()?;
        let Some(slot) = users.iter_mut().find(|user| user.id() == id) else {
            return Ok(None);
        };
        *slot = User::new(*id, draft);
        let updated = slot.clone();
        self.store(&users)?;
        Ok(Some(updated))
    }

    async fn remove_by_id(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let _guard = self.guard();
        let mut users = self.load()?;
        let before = users.len();
        users.retain(|user| user.id() != id);
        if users.len() == before {
            return Ok(false);
        }
        self.store(&users)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn repo_in(dir: &TempDir) -> JsonFileUserRepository {
        JsonFileUserRepository::new(dir.path().join("users.json"))
    }

    fn draft(name: &str, email: &str) -> UserDraft {
        UserDraft::new(name, email).expect("valid draft")
    }

    #[tokio::test]
    async fn missing_file_is_seeded_with_an_empty_array() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);

        let users = repo.list_all().await.expect("list");
        assert!(users.is_empty());

        let raw = fs::read_to_string(dir.path().join("users.json")).expect("file exists");
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn insert_persists_a_pretty_printed_array() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);

        let user = repo.insert(draft("Ann", "ann@x.com")).await.expect("insert");

        let raw = fs::read_to_string(dir.path().join("users.json")).expect("file exists");
        assert!(raw.contains('\n'), "collection should be pretty-printed");
        assert!(raw.contains(&user.id().to_string()));
        assert!(raw.contains("\"name\": \"Ann\""));
    }

    #[tokio::test]
    async fn a_reopened_repository_sees_previous_writes() {
        let dir = TempDir::new().expect("temp dir");
        let created = repo_in(&dir)
            .insert(draft("Ann", "ann@x.com"))
            .await
            .expect("insert");

        let reopened = repo_in(&dir);
        let found = reopened
            .find_by_id(created.id())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn replace_overwrites_in_place_and_keeps_the_id() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);
        let created = repo.insert(draft("Ann", "ann@x.com")).await.expect("insert");

        let updated = repo
            .replace(created.id(), draft("Ann B", "annb@x.com"))
            .await
            .expect("replace")
            .expect("record exists");

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.name().as_ref(), "Ann B");

        let users = repo.list_all().await.expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users.first(), Some(&updated));
    }

    #[tokio::test]
    async fn replace_of_an_unknown_id_reports_absence() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);

        let outcome = repo
            .replace(&UserId::random(), draft("Ann", "ann@x.com"))
            .await
            .expect("no backend failure");
        assert_eq!(outcome, None);
        assert!(repo.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn remove_reports_absence_and_deletes_once() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);
        let created = repo.insert(draft("Ann", "ann@x.com")).await.expect("insert");

        assert!(!repo.remove_by_id(&UserId::random()).await.expect("remove"));
        assert!(repo.remove_by_id(created.id()).await.expect("remove"));
        assert!(!repo.remove_by_id(created.id()).await.expect("remove"));
        assert!(repo.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn insertion_order_is_the_natural_iteration_order() {
        let dir = TempDir::new().expect("temp dir");
        let repo = repo_in(&dir);
        for name in ["a", "b", "c"] {
            repo.insert(draft(name, "x@x.com")).await.expect("insert");
        }

        let names: Vec<String> = repo
            .list_all()
            .await
            .expect("list")
            .into_iter()
            .map(|user| user.name().as_ref().to_owned())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn a_corrupt_file_surfaces_as_a_query_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("users.json");
        fs::write(&path, "not json").expect("write corrupt file");

        let repo = JsonFileUserRepository::new(path);
        let err = repo.list_all().await.expect_err("corrupt data");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
