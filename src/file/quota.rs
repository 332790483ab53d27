//! Storage quota threshold.

use serde::Serialize;

use crate::config::StorageConfig;

/// Default warning threshold: 45 MiB, i.e. 90% of a 50 MiB allowance.
pub const DEFAULT_QUOTA_WARNING_BYTES: u64 = 45 * 1024 * 1024;

/// Whether `used_bytes` should raise the quota banner.
///
/// Strictly greater than: usage exactly at the threshold does not warn.
pub fn quota_warning(used_bytes: u64, threshold_bytes: u64) -> bool {
    used_bytes > threshold_bytes
}

/// Thresholds applied to a user's storage usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Nominal allowance in bytes.
    pub limit_bytes: u64,
    /// Usage above this shows a warning.
    pub warning_bytes: u64,
}

impl QuotaPolicy {
    /// Build the policy from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            limit_bytes: config.quota_limit_mb * 1024 * 1024,
            warning_bytes: config.quota_warning_mb * 1024 * 1024,
        }
    }

    /// Evaluate usage against this policy.
    pub fn usage(&self, used_bytes: u64) -> StorageUsage {
        StorageUsage {
            used_bytes,
            limit_bytes: self.limit_bytes,
            warning: quota_warning(used_bytes, self.warning_bytes),
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            limit_bytes: 50 * 1024 * 1024,
            warning_bytes: DEFAULT_QUOTA_WARNING_BYTES,
        }
    }
}

/// A user's storage usage at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct StorageUsage {
    /// Sum of file sizes in bytes.
    pub used_bytes: u64,
    /// Nominal allowance in bytes.
    pub limit_bytes: u64,
    /// Whether the quota banner should be shown.
    pub warning: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let threshold = 45 * 1024 * 1024;
        assert!(quota_warning(threshold + 1, threshold));
        assert!(!quota_warning(threshold, threshold));
        assert!(!quota_warning(0, threshold));
    }

    #[test]
    fn test_default_policy() {
        let policy = QuotaPolicy::default();
        assert_eq!(policy.warning_bytes, DEFAULT_QUOTA_WARNING_BYTES);

        let usage = policy.usage(DEFAULT_QUOTA_WARNING_BYTES + 1);
        assert!(usage.warning);
        assert_eq!(usage.limit_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_policy_from_config() {
        let config = StorageConfig {
            quota_limit_mb: 100,
            quota_warning_mb: 90,
            ..Default::default()
        };
        let policy = QuotaPolicy::from_config(&config);
        assert_eq!(policy.limit_bytes, 100 * 1024 * 1024);
        assert_eq!(policy.warning_bytes, 90 * 1024 * 1024);
        assert!(!policy.usage(90 * 1024 * 1024).warning);
    }
}
