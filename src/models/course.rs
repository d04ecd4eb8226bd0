use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pool length category. Long course is a 50m pool, short course a 25m pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Course {
    #[serde(alias = "largo")]
    Long,
    #[serde(alias = "corto")]
    Short,
}

impl Course {
    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Long => "long",
            Course::Short => "short",
        }
    }

    /// Length of one pool in meters.
    pub fn pool_length(&self) -> u32 {
        match self {
            Course::Long => 50,
            Course::Short => 25,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Course {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "long" | "largo" | "lcm" => Ok(Course::Long),
            "short" | "corto" | "scm" => Ok(Course::Short),
            other => Err(format!("unknown course '{other}' (expected long or short)")),
        }
    }
}
