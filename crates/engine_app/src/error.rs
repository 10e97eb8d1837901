//! Startup and asset error types.

/// Errors that abort startup before either cadence begins.
///
/// None of these are retried; the loop never starts in a partial state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The platform has no drawing surface with the configured id.
    #[error("drawing surface '{0}' not found")]
    SurfaceNotFound(String),

    /// The surface exists but could not provide a drawing context.
    #[error("drawing context for surface '{0}' is unavailable")]
    ContextUnavailable(String),

    /// The initialization callback failed.
    #[error("initialization failed: {0:#}")]
    Init(anyhow::Error),

    /// An asset batch failed to load during startup.
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Errors raised while loading an asset batch.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// One resource of the batch failed; the whole batch is rejected.
    #[error("failed to load asset '{name}' from '{path}': {source}")]
    Load {
        /// The name the resource was requested under.
        name: String,
        /// The path it was loaded from.
        path: String,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors raised while loading a [`LoopConfig`](crate::LoopConfig) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// The config file path.
        path: String,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid config.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// The config file path.
        path: String,
        /// The parser error.
        #[source]
        source: serde_json::Error,
    },
}
