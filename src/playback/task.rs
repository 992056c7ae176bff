use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use super::RunSummary;
use crate::animator::{Animator, Dice};
use crate::sink::TextSink;

/// Drives the animator from an async task.
///
/// Every step waits on `tokio::time::sleep`. The loop ends as soon as `cancel`
/// observes a new value or its sender is dropped.
pub async fn run_animation_async<D, S>(
    animator: &mut Animator<D>,
    sink: &mut S,
    mut cancel: watch::Receiver<bool>,
) -> Result<RunSummary>
where
    D: Dice,
    S: TextSink + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut delay = animator.start();

    if *cancel.borrow_and_update() {
        summary.cancelled = true;
        return Ok(summary);
    }

    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.changed() => {
                summary.cancelled = true;
                break;
            }
        }
        summary.elapsed += delay;

        delay = animator.step(sink)?;
        summary.steps += 1;
    }

    info!(steps = summary.steps, "async animation stopped");
    Ok(summary)
}
