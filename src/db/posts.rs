use rusqlite::{params, OptionalExtension};

use super::models::{Post, User};
use super::RepositoryError;
use crate::state::DbPool;

#[derive(Clone)]
pub struct PostStore {
    pool: DbPool,
}

impl PostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(
        &self,
        title: &str,
        body: &str,
        author_id: i64,
        created_date: &str,
    ) -> Result<Post, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO posts (created_date, title, body, author_id) VALUES (?1, ?2, ?3, ?4)",
            params![created_date, title, body, author_id],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            created_date: created_date.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            author_id: Some(author_id),
        })
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT id, created_date, title, body, author_id FROM posts WHERE id = ?1",
                params![id],
                Post::from_row,
            )
            .optional()?;
        Ok(post)
    }

    /// Newest first.
    pub fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, created_date, title, body, author_id FROM posts
             WHERE author_id = ?1 ORDER BY id DESC",
        )?;
        let posts = stmt
            .query_map(params![author_id], Post::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Load a post together with its author, if the author row still exists.
    pub fn find_with_author(&self, id: i64) -> Result<Option<(Post, Option<User>)>, RepositoryError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT p.id, p.created_date, p.title, p.body, p.author_id,
                        u.id, u.username, u.password
                 FROM posts p
                 LEFT JOIN users u ON u.id = p.author_id
                 WHERE p.id = ?1",
                params![id],
                |row| {
                    let post = Post::from_row(row)?;
                    let author = match row.get::<_, Option<i64>>(5)? {
                        Some(author_id) => Some(User {
                            id: author_id,
                            username: row.get(6)?,
                            password_hash: row.get(7)?,
                        }),
                        None => None,
                    };
                    Ok((post, author))
                },
            )
            .optional()?;
        Ok(row)
    }
}
