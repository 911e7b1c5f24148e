//! Attack log sinks

use crate::AttackRecord;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Attack log storage backend trait
#[async_trait]
pub trait AuditBackend: Send + Sync {
    /// Verify the sink can take a record right now.
    async fn check_available(&self) -> Result<(), AuditBackendError> {
        Ok(())
    }

    /// Append a record
    async fn write(&self, record: &AttackRecord) -> Result<(), AuditBackendError>;

    /// Flush any pending writes
    async fn flush(&self) -> Result<(), AuditBackendError>;
}

/// Audit backend errors
#[derive(Debug, thiserror::Error)]
pub enum AuditBackendError {
    #[error("Log destination not found: {}", .0.display())]
    DestinationUnavailable(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Directory backend
///
/// Appends one JSON object per line to `<directory>/<YYYYMMDD>.log`, one
/// file per UTC day. The directory itself is never created: a missing
/// directory is a configuration fault and is reported, not papered over.
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File that records written now land in.
    pub fn current_file(&self) -> PathBuf {
        self.directory
            .join(format!("{}.log", Utc::now().format("%Y%m%d")))
    }
}

#[async_trait]
impl AuditBackend for FileBackend {
    async fn check_available(&self) -> Result<(), AuditBackendError> {
        match tokio::fs::metadata(&self.directory).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(AuditBackendError::DestinationUnavailable(
                self.directory.clone(),
            )),
        }
    }

    async fn write(&self, record: &AttackRecord) -> Result<(), AuditBackendError> {
        let json = record.to_json()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_file())
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }

    async fn flush(&self) -> Result<(), AuditBackendError> {
        // Every write is flushed before returning
        Ok(())
    }
}

/// Memory backend for testing
#[derive(Clone)]
pub struct MemoryBackend {
    records: Arc<tokio::sync::Mutex<Vec<AttackRecord>>>,
    available: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            records: Arc::new(tokio::sync::Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get all records
    pub async fn records(&self) -> Vec<AttackRecord> {
        self.records.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }

    /// Simulate the destination going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditBackend for MemoryBackend {
    async fn check_available(&self) -> Result<(), AuditBackendError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuditBackendError::DestinationUnavailable(PathBuf::from(
                "memory",
            )))
        }
    }

    async fn write(&self, record: &AttackRecord) -> Result<(), AuditBackendError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), AuditBackendError> {
        Ok(())
    }
}

/// Stdout backend for development
pub struct StdoutBackend;

impl StdoutBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditBackend for StdoutBackend {
    async fn write(&self, record: &AttackRecord) -> Result<(), AuditBackendError> {
        println!("{}", record.to_json()?);
        Ok(())
    }

    async fn flush(&self) -> Result<(), AuditBackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csrfp_core::RequestType;

    #[tokio::test]
    async fn test_memory_backend() {
        let backend = MemoryBackend::new();
        let record = AttackRecord::new(RequestType::Post).host("example.com");

        backend.write(&record).await.unwrap();

        let records = backend.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "example.com");
    }

    #[tokio::test]
    async fn test_memory_backend_availability() {
        let backend = MemoryBackend::new();
        assert!(backend.check_available().await.is_ok());

        backend.set_available(false);
        assert!(matches!(
            backend.check_available().await,
            Err(AuditBackendError::DestinationUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_file_backend_writes_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.check_available().await.unwrap();
        backend
            .write(&AttackRecord::new(RequestType::Get).request_uri("/a"))
            .await
            .unwrap();
        backend
            .write(&AttackRecord::new(RequestType::Post).request_uri("/b"))
            .await
            .unwrap();

        let file = backend.current_file();
        assert_eq!(file.parent(), Some(dir.path()));

        let content = tokio::fs::read_to_string(&file).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AttackRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.request_uri, "/a");
    }

    #[tokio::test]
    async fn test_file_backend_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("does-not-exist"));

        let err = backend.check_available().await.unwrap_err();
        assert!(matches!(err, AuditBackendError::DestinationUnavailable(_)));
        assert!(err.to_string().contains("does-not-exist"));
    }
}
