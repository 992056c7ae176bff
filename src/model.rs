use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::animator::AnimatorConfig;

pub const TIMELINE_VERSION: u32 = 1;

/// A recorded run of the animation that can be replayed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub version: u32,
    pub config: TimelineConfig,
    pub frames: Vec<Frame>,
}

impl Timeline {
    pub fn ensure_supported(&self) -> Result<()> {
        ensure!(
            self.version == TIMELINE_VERSION,
            "unsupported timeline version {}; expected {}",
            self.version,
            TIMELINE_VERSION
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub phrases: Vec<String>,
    pub seed: Option<u64>,
    /// Every timing range and probability the run was recorded with.
    pub animator: AnimatorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Wait { ms: u64 },
    Show { text: String },
}
