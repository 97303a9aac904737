use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chirp_types::{validate_username, Post, User, UserId};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// `AUTOINCREMENT` keeps SQLite from ever reusing the id of a deleted row,
/// including across restarts.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS posts (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        author TEXT NOT NULL,
        content TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author, seq);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed record store.
///
/// A single connection sits behind a `Mutex`; every operation holds it for
/// one statement or one transaction and never longer. Id assignment is
/// delegated to the `users` table's auto-increment key.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(db_path = %path.display(), "opening sqlite record store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        debug!("sqlite schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl RecordStore for SqliteRecordStore {
    fn create_user(&self, username: &str) -> StoreResult<User> {
        validate_username(username)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            debug!(username, "rejecting duplicate username");
            return Err(StoreError::UsernameTaken(username.to_string()));
        }
        tx.execute("INSERT INTO users (username) VALUES (?1)", [username])
            .map_err(|e| insert_error(e, username))?;
        let id = from_sql_id(tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(User::new(id, username))
    }

    fn retrieve_user(&self, id: UserId) -> StoreResult<User> {
        let Some(key) = to_sql_id(id) else {
            return Err(StoreError::UserNotFound(id));
        };
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1",
                [key],
                user_row,
            )
            .optional()?;
        row.map(into_user)
            .transpose()?
            .ok_or(StoreError::UserNotFound(id))
    }

    fn delete_user(&self, id: UserId) -> StoreResult<User> {
        let Some(key) = to_sql_id(id) else {
            return Err(StoreError::UserNotFound(id));
        };
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let row = tx
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1",
                [key],
                user_row,
            )
            .optional()?;
        let Some(row) = row else {
            return Err(StoreError::UserNotFound(id));
        };
        let user = into_user(row)?;
        tx.execute("DELETE FROM users WHERE id = ?1", [key])?;
        tx.commit()?;
        debug!(%id, username = %user.username, "deleted user");
        Ok(user)
    }

    fn create_post(&self, author: &str, content: &str) -> StoreResult<Post> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO posts (author, content) VALUES (?1, ?2)",
            params![author, content],
        )?;
        Ok(Post::new(author, content))
    }

    fn list_posts_by_author(&self, author: &str) -> StoreResult<Vec<Post>> {
        if author.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT author, content FROM posts WHERE author = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map([author], |row| {
            Ok(Post::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let posts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT id, username FROM users ORDER BY id ASC")?;
        let rows = stmt.query_map([], user_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(into_user(row?)?);
        }
        Ok(users)
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, username FROM users WHERE username = ?1",
                [username],
                user_row,
            )
            .optional()?;
        row.map(into_user)
            .transpose()?
            .ok_or_else(|| StoreError::UsernameNotFound(username.to_string()))
    }

    fn user_count(&self) -> StoreResult<usize> {
        count(&*self.lock()?, "SELECT COUNT(*) FROM users")
    }

    fn post_count(&self) -> StoreResult<usize> {
        count(&*self.lock()?, "SELECT COUNT(*) FROM posts")
    }
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = self
            .conn
            .lock()
            .ok()
            .and_then(|c| c.path().map(str::to_owned));
        f.debug_struct("SqliteRecordStore")
            .field("path", &path)
            .finish()
    }
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<(i64, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn into_user((id, username): (i64, String)) -> StoreResult<User> {
    Ok(User::new(from_sql_id(id)?, username))
}

fn from_sql_id(raw: i64) -> StoreResult<UserId> {
    u64::try_from(raw)
        .map(UserId::new)
        .map_err(|_| StoreError::Unavailable(format!("negative user id in database: {raw}")))
}

/// Ids beyond `i64::MAX` cannot exist in SQLite.
fn to_sql_id(id: UserId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn count(conn: &Connection, sql: &str) -> StoreResult<usize> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    usize::try_from(n).map_err(|_| StoreError::Unavailable(format!("bad row count: {n}")))
}

/// The pre-insert lookup already rejects duplicates; the `UNIQUE` constraint
/// is the backstop for writers outside this process.
fn insert_error(err: rusqlite::Error, username: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::UsernameTaken(username.to_string())
        }
        _ => err.into(),
    }
}
