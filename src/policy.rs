//! Pre- and post-transfer limits.

use crate::config::LimitsConfig;
use crate::extractor::MediaMetadata;
use serde::{Deserialize, Serialize};

pub const MIB: u64 = 1024 * 1024;

pub const MAX_DURATION_SECS: u64 = 600;
pub const NORMAL_LIMIT_BYTES: u64 = 25 * MIB;
pub const CLASSIC_LIMIT_BYTES: u64 = 50 * MIB;
pub const MAX_UPLOAD_BYTES: u64 = 500 * MIB;

/// Size bracket of a delivered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeTier {
    Normal,
    RequiresClassicUpgrade,
    RequiresBoostOrNitro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationRejection {
    pub duration_seconds: u64,
    pub limit_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRejection {
    pub size_bytes: u64,
    pub limit_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub max_duration_secs: u64,
    pub normal_limit_bytes: u64,
    pub classic_limit_bytes: u64,
    pub max_upload_bytes: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_duration_secs: MAX_DURATION_SECS,
            normal_limit_bytes: NORMAL_LIMIT_BYTES,
            classic_limit_bytes: CLASSIC_LIMIT_BYTES,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl From<&LimitsConfig> for Policy {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            max_duration_secs: limits.max_duration_secs,
            normal_limit_bytes: limits.normal_max_mb * MIB,
            classic_limit_bytes: limits.classic_max_mb * MIB,
            max_upload_bytes: limits.max_upload_mb * MIB,
        }
    }
}

impl Policy {
    /// Unknown durations pass; the size check still applies after transfer.
    pub fn check_duration(&self, metadata: &MediaMetadata) -> Result<(), DurationRejection> {
        match metadata.duration_seconds {
            Some(secs) if secs > self.max_duration_secs => Err(DurationRejection {
                duration_seconds: secs,
                limit_seconds: self.max_duration_secs,
            }),
            _ => Ok(()),
        }
    }

    pub fn check_size(&self, size_bytes: u64) -> Result<SizeTier, SizeRejection> {
        if size_bytes > self.max_upload_bytes {
            Err(SizeRejection {
                size_bytes,
                limit_bytes: self.max_upload_bytes,
            })
        } else if size_bytes <= self.normal_limit_bytes {
            Ok(SizeTier::Normal)
        } else if size_bytes <= self.classic_limit_bytes {
            Ok(SizeTier::RequiresClassicUpgrade)
        } else {
            Ok(SizeTier::RequiresBoostOrNitro)
        }
    }
}

impl SizeTier {
    /// Line appended to the success message, if any.
    pub fn advisory(&self, size_bytes: u64) -> Option<String> {
        match self {
            Self::Normal => None,
            Self::RequiresClassicUpgrade => Some(format!(
                "⚠️ File size {} - viewers need Discord Nitro Classic to preview it inline.",
                format_size(size_bytes)
            )),
            Self::RequiresBoostOrNitro => Some(format!(
                "⚠️ File size {} - viewers need Discord Nitro or a boosted server to preview it inline.",
                format_size(size_bytes)
            )),
        }
    }
}

/// Sizes are reported in MiB with two decimals, labelled "MB".
pub fn format_size(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / MIB as f64)
}
