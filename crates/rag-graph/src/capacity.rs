//! Resource instance counts.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::{GraphError, GraphResult};

/// Number of interchangeable instances a resource is created with.
///
/// Always positive. Blank text input means the default of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capacity(NonZeroU32);

impl Capacity {
    /// Single-instance resource.
    pub const ONE: Capacity = Capacity(NonZeroU32::MIN);

    /// Create a capacity, rejecting zero.
    pub fn new(instances: u32) -> GraphResult<Self> {
        NonZeroU32::new(instances)
            .map(Self)
            .ok_or_else(|| GraphError::InvalidCapacity {
                input: instances.to_string(),
            })
    }

    /// Number of instances.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = GraphError;

    fn try_from(value: i64) -> GraphResult<Self> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or_else(|| GraphError::InvalidCapacity {
                input: value.to_string(),
            })
    }
}

impl FromStr for Capacity {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        // Digits only: signs, decimals and whitespace inside are rejected.
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GraphError::InvalidCapacity { input: s.to_string() });
        }
        text.parse::<u32>()
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or_else(|| GraphError::InvalidCapacity { input: s.to_string() })
    }
}
