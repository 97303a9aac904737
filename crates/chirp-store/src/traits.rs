use chirp_types::{Post, User, UserId};

use crate::error::StoreResult;

/// Canonical store of users and posts.
///
/// All implementations must satisfy these invariants:
/// - No two live users share a username at any observable instant.
/// - User ids are assigned in strictly increasing creation order and are
///   never reused, including ids of deleted users.
/// - Posts are independent of users: deleting a user never touches posts.
/// - Read-then-write sequences (`create_user`, `delete_user`) are atomic
///   with respect to every other operation on the same store.
/// - Results are owned copies; callers can never mutate stored records.
pub trait RecordStore: Send + Sync {
    /// Register a new user and return it with its freshly assigned id.
    ///
    /// Returns `InvalidInput` for an empty username and `UsernameTaken` if a
    /// live user already holds it. Neither failure mutates the store.
    fn create_user(&self, username: &str) -> StoreResult<User>;

    /// Fetch the user with this id, or `UserNotFound`.
    fn retrieve_user(&self, id: UserId) -> StoreResult<User>;

    /// Remove the user with this id and return the removed record.
    ///
    /// Returns `UserNotFound` without mutating if the id is not live. The
    /// id is not recycled and the user's posts are kept.
    fn delete_user(&self, id: UserId) -> StoreResult<User>;

    /// Append a post. The author is not checked against registered users.
    fn create_post(&self, author: &str, content: &str) -> StoreResult<Post>;

    /// All posts whose author equals `author` exactly, in insertion order.
    ///
    /// An empty author or no matches yields an empty vector.
    fn list_posts_by_author(&self, author: &str) -> StoreResult<Vec<Post>>;

    /// All live users in ascending id order.
    fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Resolve a username to its live user, or `UsernameNotFound`.
    fn get_user_by_username(&self, username: &str) -> StoreResult<User>;

    /// Number of live users.
    ///
    /// Default implementation materializes [`list_users`](Self::list_users).
    /// Backends may override with a cheaper count.
    fn user_count(&self) -> StoreResult<usize> {
        Ok(self.list_users()?.len())
    }

    /// Number of stored posts.
    fn post_count(&self) -> StoreResult<usize>;
}
