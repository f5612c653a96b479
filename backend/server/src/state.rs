use std::sync::Arc;

use anyhow::Result;

use super::{config::Config, upstream::Upstream};

pub struct AppState {
    pub config: Config,
    pub upstream: Upstream,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let upstream = Upstream::new(&config.api_url, config.upstream_timeout)?;

        Ok(Arc::new(Self { config, upstream }))
    }
}
