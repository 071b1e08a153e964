//! Runtime abstraction for medirec.
//!
//! The same application logic runs against either the native desktop
//! runtime or the browser runtime. This crate owns that branching:
//! - [`Environment`] detects, once, which runtime is present
//! - [`RuntimeService`] lazily constructs and memoizes one storage and
//!   one network service for the detected environment
//! - [`ConnectivityMonitor`] watches the link and notifies listeners on
//!   online/offline transitions
//!
//! Collaborators never instantiate a concrete service themselves; they
//! ask the runtime service and receive whichever implementation matches
//! the environment.

mod environment;
mod monitor;
mod runtime;

pub use environment::{Environment, BRIDGE_MARKER_ENV};
pub use monitor::{ConnectivityMonitor, ListenerHandle, MONITOR_INTERVAL};
pub use runtime::{RuntimeConfig, RuntimeService};
