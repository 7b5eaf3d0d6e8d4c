use clap::Args;

use common::content::path;

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// File to print
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("no such file: {0}")]
    NotFound(String),
    #[error("is a directory: {0}")]
    IsDirectory(String),
}

#[async_trait::async_trait]
impl crate::op::Op for Cat {
    type Error = CatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, fs) = ctx.open().await?;
        let target = path::normalize(&self.path);
        if fs.is_dir(&target) {
            return Err(CatError::IsDirectory(target));
        }
        fs.content(&target).ok_or(CatError::NotFound(target))
    }
}
