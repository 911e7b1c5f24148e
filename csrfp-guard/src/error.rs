use csrfp_audit::AuditBackendError;
use csrfp_config::ConfigError;
use csrfp_session::SessionError;
use std::path::PathBuf;
use thiserror::Error;

/// Faults that abort a request.
///
/// A failed token check is not one of them; it is reported as a
/// [`Verdict`](crate::Verdict).
#[derive(Error, Debug)]
pub enum CsrfpError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Attack log destination unavailable: {}", .0.display())]
    LogDestinationUnavailable(PathBuf),

    #[error("Attack log error: {0}")]
    Audit(AuditBackendError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl From<AuditBackendError> for CsrfpError {
    fn from(err: AuditBackendError) -> Self {
        match err {
            AuditBackendError::DestinationUnavailable(path) => {
                CsrfpError::LogDestinationUnavailable(path)
            }
            other => CsrfpError::Audit(other),
        }
    }
}

impl From<CsrfpError> for csrfp_core::Error {
    fn from(err: CsrfpError) -> Self {
        csrfp_core::Error::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CsrfpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_sink_maps_to_log_destination() {
        let err: CsrfpError =
            AuditBackendError::DestinationUnavailable(PathBuf::from("/missing")).into();
        assert!(matches!(err, CsrfpError::LogDestinationUnavailable(_)));

        let core: csrfp_core::Error = err.into();
        assert_eq!(core.status_code(), 500);
    }
}
