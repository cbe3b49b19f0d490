//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during setup and the hauling
//! run so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: stockcap_core::config::ConfigError,
    },

    /// Reading or writing the limit snapshot failed.
    #[error("limits error: {source}")]
    Limits {
        /// The underlying limits error.
        #[from]
        source: stockcap_limits::LimitError,
    },

    /// World construction or mutation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: stockcap_world::WorldError,
    },

    /// The configuration describes nothing to haul into.
    #[error("setup error: {message}")]
    Setup {
        /// Description of the setup failure.
        message: String,
    },
}
