pub mod backend;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use backend::{ChatBackend, HttpBackend};
pub use config::{Config, DEFAULT_BACKEND_URL};
pub use error::{BackendError, ConfigError};
pub use session::{ChatSession, InputKey, Rejection, Submission};
pub use state::{Exchange, ExchangeState, ERROR_SENTINEL, PLACEHOLDER};
