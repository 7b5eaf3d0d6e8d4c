use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args};

use common::content::{WriteError, WriteOptions};

use crate::op::OpenError;

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["content", "file"])))]
pub struct Write {
    /// File to write
    pub path: String,

    /// New content, inline
    #[arg(long)]
    pub content: Option<String>,

    /// Read the new content from a local file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Create the file if it doesn't exist
    #[arg(long)]
    pub create: bool,

    /// Overwrite even if the file changed since it was loaded
    #[arg(long)]
    pub force: bool,

    /// The version (updated timestamp) the write is based on
    #[arg(long)]
    pub expected_updated_at: Option<DateTime<Utc>>,

    /// Elevate with this token for this write only
    #[arg(long)]
    pub token: Option<String>,
}

impl Write {
    #[cfg(test)]
    pub fn creating(path: &str, content: &str) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
            file: None,
            create: true,
            force: false,
            expected_updated_at: None,
            token: None,
        }
    }

    #[cfg(test)]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteOpError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("one of --content or --file is required")]
    NoContent,
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[async_trait::async_trait]
impl crate::op::Op for Write {
    type Error = WriteOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let content = match (&self.content, &self.file) {
            (Some(content), _) => content.clone(),
            (None, Some(file)) => {
                tokio::fs::read_to_string(file)
                    .await
                    .map_err(|source| WriteOpError::Read {
                        path: file.clone(),
                        source,
                    })?
            }
            (None, None) => return Err(WriteOpError::NoContent),
        };

        let state = ctx.state().map_err(OpenError::from)?;
        // a one-shot token never reaches session.json
        let elevation = match &self.token {
            Some(token) => {
                let elevation = ctx.transient_elevation(&state);
                elevation.set_token(token.clone(), None);
                elevation
            }
            None => ctx.elevation(&state),
        };
        let fs = ctx.load(&state, elevation).await?;

        let options = WriteOptions {
            expected_updated_at: self.expected_updated_at,
            force: self.force,
            allow_create: self.create,
        };
        let outcome = fs.write_file(&self.path, content, options).await?;

        let verb = if outcome.created { "created" } else { "wrote" };
        Ok(format!(
            "{} {} (version {})",
            verb,
            outcome.path,
            outcome.updated_at.to_rfc3339()
        ))
    }
}
