//! Credential store. Username uniqueness is enforced by the UNIQUE
//! constraint on `users.username`; callers may pre-check with
//! [`UserStore::find_by_username`] but must still handle
//! [`RepositoryError::DuplicateUsername`] from [`UserStore::create`].

use rusqlite::{params, OptionalExtension};

use super::models::User;
use super::RepositoryError;
use crate::state::DbPool;

#[derive(Clone)]
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                params![username],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password FROM users WHERE id = ?1",
                params![id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a new user. The hash must already be computed.
    pub fn create(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password_hash],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::DuplicateUsername
            } else {
                RepositoryError::Sql(e)
            }
        })?;

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, test_pool};
    use std::sync::{Arc, Barrier};

    #[test]
    fn create_then_find_by_username_and_id() {
        let store = UserStore::new(test_pool());
        let created = store.create("alice", "hash").unwrap();

        let by_name = store.find_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.password_hash, "hash");

        let by_id = store.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[test]
    fn missing_user_is_none() {
        let store = UserStore::new(test_pool());
        assert!(store.find_by_username("nobody").unwrap().is_none());
        assert!(store.find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn ids_are_monotonic() {
        let store = UserStore::new(test_pool());
        let a = store.create("alice", "h").unwrap();
        let b = store.create("bob", "h").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = UserStore::new(test_pool());
        store.create("alice", "h").unwrap();
        store.create("Alice", "h").unwrap();
        assert!(store.find_by_username("ALICE").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = UserStore::new(test_pool());
        store.create("alice", "h1").unwrap();

        let err = store.create("alice", "h2").unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateUsername));
    }

    #[test]
    fn concurrent_creates_produce_exactly_one_user() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = create_pool(&tmp.path().join("race.db")).unwrap();
        run_migrations(&pool).unwrap();
        let store = UserStore::new(pool.clone());

        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    store.create("racer", "h")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(RepositoryError::DuplicateUsername)))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(dup, workers - 1);

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = 'racer'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
