use serde::{Deserialize, Serialize};

use crate::decoder::BinaryDecoder;
use crate::error::Result;
use crate::guard::GuardedDecoder;


/// Limits applied by a `GuardedDecoder` to every container header.
///
/// Loaded once and handed to the decoder at construction, e.g. from JSON:
///
/// ```
/// let config = tguard::GuardConfig::from_json_str(r#"{ "max_read_length": 4096 }"#).unwrap();
/// assert_eq!(config.budget(), Some(4096));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Ceiling on a container's declared element count. Unset or negative
    /// disables the ceiling; negative sizes are rejected regardless.
    pub max_read_length: Option<i32>,

    /// Weigh the declared size by the minimum encoded size of the element
    /// type(s) before comparing against the ceiling, instead of assuming one
    /// byte per element.
    pub per_type_minimum: bool,
}

impl GuardConfig {
    pub fn new() -> GuardConfig {
        GuardConfig::default()
    }

    pub fn with_max_read_length(mut self, max_read_length: i32) -> GuardConfig {
        self.max_read_length = Some(max_read_length);
        self
    }

    pub fn with_per_type_minimum(mut self, enabled: bool) -> GuardConfig {
        self.per_type_minimum = enabled;
        self
    }

    /// Budget sized to an input buffer: a container cannot hold more
    /// one-byte elements than there are bytes.
    pub fn for_buffer(len: usize) -> GuardConfig {
        GuardConfig::default().with_max_read_length(i32::try_from(len).unwrap_or(i32::MAX))
    }

    pub fn from_json_str(json: &str) -> Result<GuardConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// The active ceiling, `None` when the check is disabled.
    pub fn budget(&self) -> Option<i32> {
        self.max_read_length.filter(|budget| *budget >= 0)
    }

    /// Builds a guarded decoder over `buffer` using this config.
    pub fn decoder<'buf>(&self, buffer: &'buf [u8]) -> GuardedDecoder<BinaryDecoder<'buf>> {
        GuardedDecoder::with_config(BinaryDecoder::new(buffer), *self)
    }
}
