use std::fmt;

use crate::backend::SurfaceError;

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// No surface for this epoch; the next window-available event starts fresh.
    SurfaceAcquisition(SurfaceError),
    /// A surface is already bound; nothing was re-initialized.
    AlreadyReady,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::SurfaceAcquisition(e) => write!(f, "{e}"),
            LifecycleError::AlreadyReady => write!(f, "surface already ready"),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifecycleError::SurfaceAcquisition(e) => Some(e),
            LifecycleError::AlreadyReady => None,
        }
    }
}

impl From<SurfaceError> for LifecycleError {
    fn from(e: SurfaceError) -> Self {
        LifecycleError::SurfaceAcquisition(e)
    }
}
