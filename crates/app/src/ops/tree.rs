use clap::Args;

use common::content::path;

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
pub struct Tree {
    /// Directory to start from
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

#[async_trait::async_trait]
impl crate::op::Op for Tree {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, fs) = ctx.open().await?;
        let root = path::normalize(&self.path);
        if !fs.is_dir(&root) {
            return Err(TreeError::NotADirectory(root));
        }

        let base_depth = path::segments(&root).count();
        let mut lines = vec![root.clone()];
        for descendant in fs.walk(&root) {
            let depth = path::segments(&descendant).count() - base_depth;
            let suffix = if fs.is_dir(&descendant) { "/" } else { "" };
            lines.push(format!(
                "{}{}{}",
                "  ".repeat(depth),
                path::name(&descendant),
                suffix
            ));
        }
        Ok(lines.join("\n"))
    }
}
