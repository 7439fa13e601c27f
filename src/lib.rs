// src/lib.rs
// =============================================================================
// linkgate: outbound-link mediation and partner-link status cache.
//
// Two independent pieces:
// - mediator: decides which outbound links go through the /go redirect page,
//   and rewrites the anchors of a page accordingly
// - status: keeps a time-bounded cache of externally probed latency data for
//   partner links, with point lookups and severity tags
//
// Both read their settings from config::HostConfig. The binary in main.rs is
// a thin command-line host around them.
// =============================================================================

pub mod config;
pub mod error;
pub mod mediator;
pub mod status;

pub use config::{DarkMode, HostConfig, MediationConfig, StatusConfig};
pub use error::{ConfigError, MediationError, StatusError};
