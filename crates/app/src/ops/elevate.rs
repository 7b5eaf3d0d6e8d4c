use clap::Args;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Elevate {
    /// Write token to install
    #[arg(long)]
    pub token: String,

    /// Seconds until the token expires (defaults to the configured TTL)
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Mirror the token into session.json even if the config says not to
    #[arg(long)]
    pub persist: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ElevateError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("ttl of {0} seconds is out of range")]
    InvalidTtl(u64),
}

#[async_trait::async_trait]
impl crate::op::Op for Elevate {
    type Error = ElevateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let elevation = ctx.elevation(&state);

        let expires_at = match self.ttl_secs {
            Some(secs) => Some(
                i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .and_then(|ttl| ctx.clock.now().checked_add_signed(ttl))
                    .ok_or(ElevateError::InvalidTtl(secs))?,
            ),
            None => None,
        };

        let persist = self.persist || state.config.persist_elevation;
        elevation.set_persist(persist);
        elevation.set_token(self.token.clone(), expires_at);

        let expires_at = elevation
            .current()
            .map(|t| t.expires_at.to_rfc3339())
            .unwrap_or_else(|| "now".to_string());
        if persist {
            Ok(format!("elevated until {}", expires_at))
        } else {
            Ok(format!(
                "elevated until {} (not persisted; pass --token to write instead)",
                expires_at
            ))
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct Deelevate;

#[async_trait::async_trait]
impl crate::op::Op for Deelevate {
    type Error = ElevateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ctx.elevation(&state).clear();
        Ok("elevation cleared".to_string())
    }
}
