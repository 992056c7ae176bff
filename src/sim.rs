use anyhow::Result;

use crate::animator::{Animator, Dice};
use crate::model::{Frame, Timeline, TimelineConfig, TIMELINE_VERSION};
use crate::sink::TextSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineStats {
    pub frames: usize,
    pub text_updates: usize,
    pub total_wait_ms: u64,
}

pub fn stats(timeline: &Timeline) -> TimelineStats {
    let mut out = TimelineStats {
        frames: timeline.frames.len(),
        ..Default::default()
    };

    for frame in &timeline.frames {
        match frame {
            Frame::Wait { ms } => {
                out.total_wait_ms = out.total_wait_ms.saturating_add(*ms);
            }
            Frame::Show { .. } => out.text_updates += 1,
        }
    }

    out
}

#[derive(Debug, Default)]
struct FrameBuilder {
    frames: Vec<Frame>,
}

impl FrameBuilder {
    fn wait(&mut self, ms: u64) {
        if ms == 0 {
            return;
        }
        // Steps that leave the text alone produce back-to-back waits.
        if let Some(Frame::Wait { ms: last }) = self.frames.last_mut() {
            *last = last.saturating_add(ms);
            return;
        }
        self.frames.push(Frame::Wait { ms });
    }
}

impl TextSink for FrameBuilder {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.frames.push(Frame::Show {
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Runs `start` plus `steps` steps on virtual time and records what a viewer
/// would have seen.
pub fn record<D: Dice>(
    animator: &mut Animator<D>,
    steps: u64,
    seed: Option<u64>,
) -> Result<Timeline> {
    let mut builder = FrameBuilder::default();

    let start = animator.start();
    builder.wait(start.as_millis() as u64);

    for _ in 0..steps {
        let delay = animator.step(&mut builder)?;
        builder.wait(delay.as_millis() as u64);
    }

    Ok(Timeline {
        version: TIMELINE_VERSION,
        config: TimelineConfig {
            phrases: animator.phrases(),
            seed,
            animator: animator.config().clone(),
        },
        frames: builder.frames,
    })
}
