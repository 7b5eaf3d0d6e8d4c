use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Token the local store accepts for writes (repeatable)
    #[arg(long = "write-token")]
    pub write_tokens: Vec<String>,

    /// Seconds a cached file body stays fresh
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,

    /// Seconds an elevation token lives when no expiry is given
    #[arg(long)]
    pub elevation_ttl_secs: Option<u64>,

    /// Don't mirror elevation tokens into session.json
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            cache_ttl_secs: self.cache_ttl_secs.unwrap_or(defaults.cache_ttl_secs),
            elevation_ttl_secs: self
                .elevation_ttl_secs
                .unwrap_or(defaults.elevation_ttl_secs),
            persist_elevation: !self.no_persist,
            write_tokens: self.write_tokens.clone(),
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized contentfs directory at: {}\n\
             - Config: {}\n\
             - Records: {}\n\
             - Session: {}\n\
             - Write tokens: {}",
            state.state_dir.display(),
            state.config_path.display(),
            state.records_path.display(),
            state.session_path.display(),
            state.config.write_tokens.len(),
        );

        Ok(output)
    }
}
