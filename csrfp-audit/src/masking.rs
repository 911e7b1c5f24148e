//! Masking of sensitive values before records leave the process

use crate::AttackRecord;
use std::collections::BTreeMap;

/// Name fragments whose values are masked by default.
///
/// The CSRF token parameter is deliberately absent: the submitted token is
/// the evidence an attack record exists for.
pub const DEFAULT_MASKED_FIELDS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "api_key",
    "apikey",
    "access_token",
    "refresh_token",
    "authorization",
    "credit_card",
    "card_number",
    "cvv",
    "ssn",
    "private_key",
    "session",
    "sessid",
];

/// Replacement written in place of a masked value
pub const MASK: &str = "***MASKED***";

/// Data masking configuration
#[derive(Debug, Clone)]
pub struct MaskingConfig {
    /// Lower-case name fragments; a parameter or cookie whose name contains
    /// one of them is masked
    pub masked_fields: Vec<String>,
}

impl MaskingConfig {
    /// Mask nothing.
    pub fn none() -> Self {
        Self {
            masked_fields: Vec::new(),
        }
    }

    /// Add a field fragment to mask
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.masked_fields.push(field.into().to_lowercase());
        self
    }

    pub fn is_masked(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.masked_fields
            .iter()
            .any(|field| name.contains(field.as_str()))
    }
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            masked_fields: DEFAULT_MASKED_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Mask matching entries of a name/value map in place
pub fn mask_values(values: &mut BTreeMap<String, String>, config: &MaskingConfig) {
    for (name, value) in values.iter_mut() {
        if config.is_masked(name) {
            *value = MASK.to_string();
        }
    }
}

/// Mask the parameter and cookie sets of a record
pub fn mask_record(record: &mut AttackRecord, config: &MaskingConfig) {
    mask_values(&mut record.query, config);
    mask_values(&mut record.cookie, config);
}
