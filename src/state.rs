use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::password;
use crate::auth::session::SessionKeys;
use crate::config::{Config, SessionSecret};
use crate::db::{PostStore, UserStore};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionKeys,
    pub users: UserStore,
    pub posts: PostStore,
    /// Verified against when a login names an unknown user.
    pub decoy_hash: Arc<str>,
}

impl AppState {
    /// Fails only when `[auth] bcrypt_cost` is outside bcrypt's range.
    pub fn new(
        db: DbPool,
        config: Config,
        secret: &SessionSecret,
    ) -> Result<Self, bcrypt::BcryptError> {
        let decoy_hash = password::decoy_hash(config.auth.bcrypt_cost)?;
        Ok(Self {
            users: UserStore::new(db.clone()),
            posts: PostStore::new(db),
            sessions: SessionKeys::new(secret),
            decoy_hash: decoy_hash.into(),
            config,
        })
    }
}
