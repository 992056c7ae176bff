#[cfg(feature = "async")]
pub mod task;
mod util;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::animator::{Animator, Dice};
use crate::model::{Frame, Timeline};
use crate::sink::TextSink;

use util::sleep_interruptible;

/// Waits between animation steps.
pub trait Scheduler {
    /// Blocks (or advances virtual time) for `delay`.
    ///
    /// Returns `false` when the run has been cancelled and no further step
    /// should execute.
    fn wait(&mut self, delay: Duration) -> bool;
}

impl<C: Scheduler + ?Sized> Scheduler for &mut C {
    fn wait(&mut self, delay: Duration) -> bool {
        (**self).wait(delay)
    }
}

/// Sleeps on the current thread; cancelled through a shared stop flag.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    stop: Arc<AtomicBool>,
}

impl ThreadScheduler {
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl Scheduler for ThreadScheduler {
    fn wait(&mut self, delay: Duration) -> bool {
        sleep_interruptible(self.stop.as_ref(), delay)
    }
}

/// Advances a virtual clock instantly. Used for recording and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualClock {
    elapsed: Duration,
}

impl VirtualClock {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Scheduler for VirtualClock {
    fn wait(&mut self, delay: Duration) -> bool {
        self.elapsed += delay;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    /// Sum of every delay that was fully waited out.
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Starts the animator and keeps stepping it until cancelled or until
/// `max_steps` steps have run.
pub fn run_animation<D, S, C>(
    animator: &mut Animator<D>,
    sink: &mut S,
    scheduler: &mut C,
    max_steps: Option<u64>,
) -> Result<RunSummary>
where
    D: Dice,
    S: TextSink + ?Sized,
    C: Scheduler + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut delay = animator.start();

    loop {
        if max_steps.is_some_and(|max| summary.steps >= max) {
            break;
        }

        if !scheduler.wait(delay) {
            summary.cancelled = true;
            break;
        }
        summary.elapsed += delay;

        delay = animator.step(sink)?;
        summary.steps += 1;
    }

    info!(
        steps = summary.steps,
        cancelled = summary.cancelled,
        "animation loop finished"
    );
    Ok(summary)
}

/// An animation running on its own thread.
#[derive(Debug)]
pub struct AnimationHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<RunSummary>>>,
}

impl AnimationHandle {
    pub fn spawn<D, S>(mut animator: Animator<D>, mut sink: S) -> Result<Self>
    where
        D: Dice + Send + 'static,
        S: TextSink + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let mut scheduler = ThreadScheduler::new(stop.clone());

        let thread = std::thread::Builder::new()
            .name("typewriter".to_string())
            .spawn(move || run_animation(&mut animator, &mut sink, &mut scheduler, None))
            .context("failed to spawn animation thread")?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels the pending step and waits for the thread to exit.
    pub fn stop(mut self) -> Result<RunSummary> {
        self.stop.store(true, Ordering::SeqCst);
        let thread = self
            .thread
            .take()
            .ok_or_else(|| anyhow!("animation thread already joined"))?;
        thread
            .join()
            .map_err(|_| anyhow!("animation thread panicked"))?
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Replays a recorded timeline. Returns `false` if playback was cancelled.
pub fn play_timeline<S, C>(timeline: &Timeline, sink: &mut S, scheduler: &mut C) -> Result<bool>
where
    S: TextSink + ?Sized,
    C: Scheduler + ?Sized,
{
    for frame in &timeline.frames {
        match frame {
            Frame::Wait { ms } => {
                if !scheduler.wait(Duration::from_millis(*ms)) {
                    debug!("timeline playback cancelled");
                    return Ok(false);
                }
            }
            Frame::Show { text } => sink.set_text(text)?,
        }
    }

    Ok(true)
}
