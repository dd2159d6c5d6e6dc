//! Backend selection and detection.

use std::env;
use std::sync::Arc;

use tracing::{debug, info};

use super::{CompositorBackend, NullBackend, sway::SwayBackend};

/// Backend kind, as selected in `[compositor] backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Sway/i3 IPC protocol.
    Sway,
    /// No compositor IPC; every query degrades gracefully.
    None,
    /// Detect from the environment.
    Auto,
}

impl BackendKind {
    /// Parse a backend kind from the config string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sway" | "i3" => BackendKind::Sway,
            "none" => BackendKind::None,
            _ => BackendKind::Auto,
        }
    }
}

/// Detect the compositor from environment variables.
pub fn detect_backend() -> BackendKind {
    if env::var("SWAYSOCK").is_ok() || env::var("I3SOCK").is_ok() {
        debug!("detected sway IPC socket in environment");
        return BackendKind::Sway;
    }

    debug!("no compositor IPC detected");
    BackendKind::None
}

/// Create a backend for `kind`, resolving `Auto` through detection.
pub fn create_backend(kind: BackendKind) -> Arc<dyn CompositorBackend> {
    let resolved = if kind == BackendKind::Auto {
        detect_backend()
    } else {
        kind
    };

    info!("using compositor backend: {resolved:?}");

    match resolved {
        BackendKind::Sway => Arc::new(SwayBackend::new()),
        BackendKind::None | BackendKind::Auto => Arc::new(NullBackend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!(BackendKind::from_str("sway"), BackendKind::Sway);
        assert_eq!(BackendKind::from_str("SWAY"), BackendKind::Sway);
        assert_eq!(BackendKind::from_str("i3"), BackendKind::Sway);
        assert_eq!(BackendKind::from_str("none"), BackendKind::None);
        assert_eq!(BackendKind::from_str("auto"), BackendKind::Auto);
        assert_eq!(BackendKind::from_str(""), BackendKind::Auto);
        assert_eq!(BackendKind::from_str("mutter"), BackendKind::Auto);
    }
}
