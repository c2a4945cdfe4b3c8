use std::sync::Arc;

use crate::config::Config;
use crate::db::Db;

/// Shared handler context: the document store and the process configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
}
