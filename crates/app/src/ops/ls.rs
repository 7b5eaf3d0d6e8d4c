use clap::Args;

use common::content::path;

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Directory to list
    #[arg(default_value = "/")]
    pub path: String,

    /// Show kind, size and last update for each entry
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, fs) = ctx.open().await?;
        let dir = path::normalize(&self.path);
        if !fs.is_dir(&dir) {
            return Err(LsError::NotADirectory(dir));
        }

        if !self.long {
            return Ok(fs.children(&dir).join("\n"));
        }

        let lines: Vec<String> = fs
            .ls(&dir)
            .into_iter()
            .map(|stat| {
                let marker = if stat.is_directory { "d" } else { "-" };
                format!(
                    "{} {:>8} {} {}",
                    marker,
                    stat.size,
                    stat.updated_at.format("%Y-%m-%d %H:%M:%S"),
                    path::name(&stat.path)
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
