/// Endpoint naming for bulk provisioning.
///
/// A `DeviceTemplate` is the validated form of the operator's request:
/// names are `{prefix}{start + i}` with the number zero-padded to
/// `padding` digits.
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

/// Upper bound on devices per bulk run.
pub const MAX_DEVICES: u32 = 100;

/// Upper bound on the zero-padding width.
pub const MAX_PADDING: usize = 6;

/// A validated device naming template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTemplate {
    prefix: String,
    start_number: u32,
    count: u32,
    padding: usize,
}

impl DeviceTemplate {
    /// Validate and build a template. The prefix is trimmed.
    pub fn new(prefix: &str, start_number: i64, count: i64, padding: i64) -> Result<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(AdminError::Validation("devicePrefix is required".into()));
        }

        let start_number = u32::try_from(start_number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| AdminError::Validation("startNumber must be >= 1".into()))?;

        let count = u32::try_from(count)
            .ok()
            .filter(|c| (1..=MAX_DEVICES).contains(c))
            .ok_or_else(|| {
                AdminError::Validation(format!("count must be between 1 and {MAX_DEVICES}"))
            })?;

        let padding = usize::try_from(padding)
            .ok()
            .filter(|p| (1..=MAX_PADDING).contains(p))
            .ok_or_else(|| {
                AdminError::Validation(format!("paddingLength must be between 1 and {MAX_PADDING}"))
            })?;

        if start_number.checked_add(count - 1).is_none() {
            return Err(AdminError::Validation(
                "startNumber + count exceeds the numbering range".into(),
            ));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            start_number,
            count,
            padding,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Request body of `POST /api/configs/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub device_prefix: String,
    #[serde(default = "default_start_number")]
    pub start_number: i64,
    pub count: i64,
    #[serde(default = "default_padding")]
    pub padding_length: i64,
}

fn default_start_number() -> i64 {
    1
}

fn default_padding() -> i64 {
    2
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<DeviceTemplate> {
        DeviceTemplate::new(
            &self.device_prefix,
            self.start_number,
            self.count,
            self.padding_length,
        )
    }
}

/// Expand a template into its ordered endpoint names.
pub fn generate_endpoints(template: &DeviceTemplate) -> Vec<String> {
    (0..template.count)
        .map(|i| {
            format!(
                "{}{:0width$}",
                template.prefix,
                template.start_number + i,
                width = template.padding
            )
        })
        .collect()
}
