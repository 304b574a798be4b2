//! traveal-core: shared types, configuration, and error taxonomy for the
//! traveal data-protection layer.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{resolve_master_secret, TravealConfig};
pub use error::{TravealError, TravealResult};
pub use types::{AnonymizationLevel, KdfMethod, TagScheme};
