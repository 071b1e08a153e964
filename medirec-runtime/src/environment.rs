//! Runtime environment detection.

use std::fmt;

/// Environment variable the desktop shell sets before launching the
/// application. Its presence is the native bridge marker.
pub const BRIDGE_MARKER_ENV: &str = "MEDIREC_BRIDGE";

/// Which runtime the process is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Native desktop runtime with the bridge present.
    Native,
    /// Browser runtime.
    Web,
}

impl Environment {
    /// Detects the current environment. Synchronous and side-effect-free:
    /// it only inspects the bridge marker.
    #[must_use]
    pub fn detect() -> Self {
        if std::env::var_os(BRIDGE_MARKER_ENV).is_some() {
            Environment::Native
        } else {
            Environment::Web
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Native => write!(f, "native"),
            Environment::Web => write!(f, "web"),
        }
    }
}
