//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::wait::WaitConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct RapidappProviderData {
    pub client: Arc<Client>,
    pub wait_config: WaitConfig,
}

impl RapidappProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            wait_config: WaitConfig::default(),
        }
    }

    pub fn with_wait_config(mut self, wait_config: WaitConfig) -> Self {
        self.wait_config = wait_config;
        self
    }
}
