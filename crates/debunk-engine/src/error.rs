//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup so `main` can
//! propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: debunk_core::config::ConfigError,
    },

    /// The post catalogue could not be loaded or lacks the configured theme.
    #[error("catalogue error: {source}")]
    Catalogue {
        /// The underlying catalogue error.
        #[from]
        source: debunk_core::catalogue::CatalogueError,
    },

    /// The HTTP evaluator could not be constructed.
    #[error("evaluator error: {source}")]
    Evaluator {
        /// The underlying evaluator error.
        #[from]
        source: debunk_evaluator::EvaluatorError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: debunk_observer::ServerError,
    },
}
