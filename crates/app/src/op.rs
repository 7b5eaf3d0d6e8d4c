use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::clock::{SharedClock, SystemClock};
use common::content::{ContentFs, RefreshError};
use common::elevation::{ElevationStore, MemorySessionStorage};

use crate::session::FileSessionStorage;
use crate::state::{AppState, StateError};
use crate::store::FileContentStore;

/// The filesystem every op works against.
pub type LocalFs = ContentFs<FileContentStore>;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to load content: {0}")]
    Refresh(#[from] RefreshError),
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.contentfs)
    pub config_path: Option<PathBuf>,
    pub clock: SharedClock,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// The elevation store for a state directory, with any persisted
    ///  token restored.
    pub fn elevation(&self, state: &AppState) -> ElevationStore {
        ElevationStore::new(
            Box::new(FileSessionStorage::new(&state.session_path)),
            self.clock.clone(),
            Duration::from_secs(state.config.elevation_ttl_secs),
        )
    }

    /// An elevation store that lives only as long as this command. Nothing
    ///  installed in it reaches session.json.
    pub fn transient_elevation(&self, state: &AppState) -> ElevationStore {
        ElevationStore::new(
            Box::new(MemorySessionStorage::new()),
            self.clock.clone(),
            Duration::from_secs(state.config.elevation_ttl_secs),
        )
    }

    /// Load state and build a filesystem over the local record store,
    ///  restoring any persisted elevation token.
    pub async fn open(&self) -> Result<(AppState, LocalFs), OpenError> {
        let state = self.state()?;
        let elevation = self.elevation(&state);
        let fs = self.load(&state, elevation).await?;
        Ok((state, fs))
    }

    /// Build a filesystem over the local record store with the given
    ///  elevation.
    pub async fn load(
        &self,
        state: &AppState,
        elevation: ElevationStore,
    ) -> Result<LocalFs, OpenError> {
        let store = FileContentStore::new(
            &state.records_path,
            state.config.write_tokens.clone(),
            self.clock.clone(),
        );
        let fs = ContentFs::load(
            store,
            Arc::new(elevation),
            state.config.fs_config(),
            self.clock.clone(),
        )
        .await?;
        Ok(fs)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
