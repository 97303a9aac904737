use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chirp_types::{validate_username, Post, User, UserId};
use tracing::debug;

use crate::allocator::IdAllocator;
use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// Everything guarded by the store's single lock.
#[derive(Debug, Default)]
struct Records {
    users: BTreeMap<UserId, User>,
    posts: Vec<Post>,
    ids: IdAllocator,
}

/// In-memory record store.
///
/// Users, posts and the id allocator share one `RwLock`, so no operation can
/// observe a half-applied update from another. Readers proceed in parallel;
/// writers are exclusive. Records are cloned on the way out. Data is lost
/// when the store is dropped.
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
}

impl InMemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
        }
    }

    /// The id most recently handed out, including ids of deleted users.
    pub fn last_issued_id(&self) -> StoreResult<Option<UserId>> {
        Ok(self.read()?.ids.last())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create_user(&self, username: &str) -> StoreResult<User> {
        validate_username(username)?;

        let mut records = self.write()?;
        if records.users.values().any(|u| u.username == username) {
            debug!(username, "rejecting duplicate username");
            return Err(StoreError::UsernameTaken(username.to_string()));
        }
        let id = records
            .ids
            .next()
            .ok_or_else(|| StoreError::Unavailable("user id space exhausted".into()))?;
        let user = User::new(id, username);
        records.users.insert(id, user.clone());
        Ok(user)
    }

    fn retrieve_user(&self, id: UserId) -> StoreResult<User> {
        let records = self.read()?;
        records
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound(id))
    }

    fn delete_user(&self, id: UserId) -> StoreResult<User> {
        let mut records = self.write()?;
        let user = records
            .users
            .remove(&id)
            .ok_or(StoreError::UserNotFound(id))?;
        debug!(%id, username = %user.username, "deleted user");
        Ok(user)
    }

    fn create_post(&self, author: &str, content: &str) -> StoreResult<Post> {
        let post = Post::new(author, content);
        self.write()?.posts.push(post.clone());
        Ok(post)
    }

    fn list_posts_by_author(&self, author: &str) -> StoreResult<Vec<Post>> {
        if author.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.read()?;
        Ok(records
            .posts
            .iter()
            .filter(|p| p.is_by(author))
            .cloned()
            .collect())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        let records = self.read()?;
        records
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| StoreError::UsernameNotFound(username.to_string()))
    }

    fn user_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.users.len())
    }

    fn post_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.posts.len())
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("InMemoryRecordStore");
        match self.read() {
            Ok(records) => s
                .field("user_count", &records.users.len())
                .field("post_count", &records.posts.len())
                .field("last_issued_id", &records.ids.last()),
            Err(_) => s.field("poisoned", &true),
        };
        s.finish()
    }
}
