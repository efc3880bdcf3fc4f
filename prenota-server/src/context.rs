use std::sync::Arc;

use axum::extract::FromRef;
use prenota_gateway::Gateway;

use crate::ServerConfig;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub gateway: Arc<Gateway>,
    pub config: Arc<ServerConfig>,
}

impl ServerContext {
    pub fn new(config: ServerConfig) -> Self {
        let gateway = Gateway::new(config.gateway.clone());

        Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        }
    }
}
