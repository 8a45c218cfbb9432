use std::sync::Arc;

use common::FragmentStore;

use crate::auth::Authenticator;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: FragmentStore,
    pub auth: Arc<Authenticator>,
    pub config: AppConfig,
}
