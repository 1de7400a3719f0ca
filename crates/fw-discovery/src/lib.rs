//! Discovery of extension-supplied form widgets
//!
//! - [`ExtensionSource`]: the extension index (REST backend or fixtures)
//! - [`DiscoveryService`]: fetch, evaluate, wrap and register widget files
//! - [`DiscoveryReport`]: per-file outcomes of a load
//!
//! A full reload is single-flight: while one is running, a second call is
//! rejected with [`DiscoveryError::ReloadInProgress`].

#![warn(unreachable_pub)]

pub mod error;
pub mod http;
pub mod report;
pub mod service;
pub mod source;
pub mod static_source;

pub use error::{DiscoveryError, DiscoveryResult};
pub use http::{HttpExtensionSource, DEFAULT_REQUEST_TIMEOUT};
pub use report::{DiscoveryReport, ExtensionFailure, FileOutcome, FileStatus, Stage};
pub use service::DiscoveryService;
pub use source::{ExtensionSource, WidgetFileDescriptor};
pub use static_source::StaticExtensionSource;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
