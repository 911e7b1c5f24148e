//! Attack log writer

use crate::{AttackRecord, AuditBackend, AuditBackendError, MaskingConfig, mask_record};
use std::sync::Arc;
use tracing::{error, warn};

/// Audit logger
///
/// Every record passes through here: the sink is checked first, values are
/// masked, then the record is appended. A sink that is not available is an
/// error the caller must surface; records are never dropped silently.
pub struct AuditLogger {
    backend: Arc<dyn AuditBackend>,
    masking_config: MaskingConfig,
}

impl AuditLogger {
    /// Create a new audit logger builder
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csrfp_audit::*;
    ///
    /// let logger = AuditLogger::builder()
    ///     .backend(FileBackend::new("/var/log/csrfp"))
    ///     .build();
    /// ```
    pub fn builder() -> AuditLoggerBuilder {
        AuditLoggerBuilder::new()
    }

    /// Shorthand for a logger with default masking.
    pub fn new(backend: impl AuditBackend + 'static) -> Self {
        Self::builder().backend(backend).build()
    }

    /// Check the sink without writing.
    pub async fn ensure_available(&self) -> Result<(), AuditBackendError> {
        self.backend.check_available().await.inspect_err(|e| {
            error!(error = %e, "Attack log destination unavailable");
        })
    }

    /// Write an attack record
    pub async fn log(&self, mut record: AttackRecord) -> Result<(), AuditBackendError> {
        self.ensure_available().await?;

        mask_record(&mut record, &self.masking_config);

        warn!(
            record_id = %record.id,
            request_type = %record.request_type,
            host = %record.host,
            request_uri = %record.request_uri,
            "CSRF attack recorded"
        );

        self.backend.write(&record).await
    }

    /// Flush any pending writes
    pub async fn flush(&self) -> Result<(), AuditBackendError> {
        self.backend.flush().await
    }
}

/// Audit logger builder
pub struct AuditLoggerBuilder {
    backend: Option<Arc<dyn AuditBackend>>,
    masking_config: MaskingConfig,
}

impl AuditLoggerBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            masking_config: MaskingConfig::default(),
        }
    }

    /// Set the storage backend
    pub fn backend(mut self, backend: impl AuditBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Use an already shared backend
    pub fn shared_backend(mut self, backend: Arc<dyn AuditBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set masking configuration
    pub fn masking_config(mut self, config: MaskingConfig) -> Self {
        self.masking_config = config;
        self
    }

    /// Build the audit logger, writing to stdout when no backend was set
    pub fn build(self) -> AuditLogger {
        AuditLogger {
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(crate::StdoutBackend::new())),
            masking_config: self.masking_config,
        }
    }
}

impl Default for AuditLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
