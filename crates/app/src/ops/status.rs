use clap::Args;

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
pub struct Status;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    Open(#[from] OpenError),
}

#[async_trait::async_trait]
impl crate::op::Op for Status {
    type Error = StatusError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, fs) = ctx.open().await?;
        let stats = fs.stats();

        let elevation = match fs.elevation().current() {
            Some(token) => format!(
                "elevated until {}{}",
                token.expires_at.to_rfc3339(),
                if fs.elevation().persist() {
                    " (persisted)"
                } else {
                    ""
                }
            ),
            None => "not elevated".to_string(),
        };

        Ok(format!(
            "State: {}\n\
             Items: {} ({} directories, {} files)\n\
             Elevation: {}",
            state.state_dir.display(),
            stats.total_items,
            stats.directories,
            stats.files,
            elevation
        ))
    }
}
