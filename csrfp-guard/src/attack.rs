use crate::error::Result;
use csrfp_audit::{AttackRecord, AuditLogger, FileBackend};
use csrfp_core::{HttpRequest, RequestType};
use std::path::PathBuf;

/// Writes one record per failed validation.
pub struct AttackLogger {
    audit: AuditLogger,
}

impl AttackLogger {
    pub fn new(audit: AuditLogger) -> Self {
        Self { audit }
    }

    /// Daily files under `directory`, which must already exist.
    pub fn to_directory(directory: impl Into<PathBuf>) -> Self {
        Self::new(AuditLogger::new(FileBackend::new(directory)))
    }

    /// Check the destination without writing anything.
    pub async fn ensure_available(&self) -> Result<()> {
        Ok(self.audit.ensure_available().await?)
    }

    /// Record a failed validation of `request`.
    ///
    /// An unreachable destination is reported as
    /// [`LogDestinationUnavailable`](crate::CsrfpError::LogDestinationUnavailable)
    /// and nothing is written.
    pub async fn record(&self, request: &HttpRequest, request_type: RequestType) -> Result<()> {
        let record = AttackRecord::from_request(request, request_type);
        Ok(self.audit.log(record).await?)
    }
}
