//! Shared request state for HTTP handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::ports::UserRepository;

/// State injected into every API handler: the storage adapter behind the
/// routes. The handlers hold nothing else between requests, so swapping
/// backends never touches route logic.
#[derive(Clone)]
pub struct HttpState {
    users: Arc<dyn UserRepository>,
}

impl HttpState {
    /// Build the handler state around a storage adapter.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The storage adapter serving this process.
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
}

/// Directory the static web client is served from.
#[derive(Debug, Clone)]
pub struct StaticRoot(PathBuf);

impl StaticRoot {
    /// Wrap the asset directory path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    /// Location of the client's entry page.
    pub fn index_file(&self) -> PathBuf {
        self.0.join("html").join("index.html")
    }

    /// The asset directory itself.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}
