use clap::Args;

use common::content::{path, NodeStat};

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Path to describe
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("no such file or directory: {0}")]
    NotFound(String),
}

fn render(stat: &NodeStat) -> String {
    let mime = stat
        .mime_hint
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "path: {}\n\
         type: {}\n\
         title: {}\n\
         size: {}\n\
         mime: {}\n\
         created: {}\n\
         updated: {}",
        stat.path,
        stat.kind,
        stat.title,
        stat.size,
        mime,
        stat.created_at.to_rfc3339(),
        stat.updated_at.to_rfc3339(),
    )
}

#[async_trait::async_trait]
impl crate::op::Op for Stat {
    type Error = StatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, fs) = ctx.open().await?;
        let target = path::normalize(&self.path);
        fs.stat(&target)
            .map(|stat| render(&stat))
            .ok_or(StatError::NotFound(target))
    }
}
