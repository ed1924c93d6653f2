use std::fmt;

use serde::{Deserialize, Serialize};

/// Measurement unit of a runtime metric. Fixed when the accumulator is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeUnit {
    /// Plain count (rows, splits, drivers).
    None,
    /// Nanoseconds.
    Nano,
    /// Bytes.
    Byte,
}

impl RuntimeUnit {
    /// String representation used in JSON and text exposition.
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeUnit::None => "NONE",
            RuntimeUnit::Nano => "NANO",
            RuntimeUnit::Byte => "BYTE",
        }
    }
}

impl fmt::Display for RuntimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
