use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::codes::AccessCodeService;
use crate::codes::store::PgCodeStore;
use crate::directory::PgMembershipDirectory;

pub mod access_codes;
pub mod health;
pub mod routes;

// ============================================
// Application State
// ============================================

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub codes: AccessCodeService,
}

impl AppState {
    pub fn new(db: PgPool, redis: ConnectionManager) -> Self {
        let store = Arc::new(PgCodeStore::new(db.clone()));
        let directory = Arc::new(PgMembershipDirectory::new(db.clone()));
        let codes = AccessCodeService::new(store, directory);

        Self { db, redis, codes }
    }
}
