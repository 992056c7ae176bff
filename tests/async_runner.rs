#![cfg(feature = "async")]

use std::time::Duration;

use tokio::sync::watch;

use typewriter::animator::{Animator, AnimatorConfig};
use typewriter::playback::task::run_animation_async;
use typewriter::sink::RecordingSink;

#[tokio::test(start_paused = true)]
async fn async_runner_steps_until_cancelled() {
    let (tx, rx) = watch::channel(false);
    let mut animator = Animator::seeded(["cat"], AnimatorConfig::default(), Some(3)).unwrap();

    let task = tokio::spawn(async move {
        let mut sink = RecordingSink::default();
        let summary = run_animation_async(&mut animator, &mut sink, rx).await?;
        Ok::<_, anyhow::Error>((summary, sink))
    });

    tokio::time::sleep(Duration::from_secs(30)).await;
    tx.send(true).unwrap();

    let (summary, sink) = task.await.unwrap().unwrap();
    assert!(summary.cancelled);
    assert!(summary.steps > 10);
    assert!(summary.elapsed <= Duration::from_secs(30));
    assert!(sink.writes().iter().any(|w| w == "cat"));
}

#[tokio::test(start_paused = true)]
async fn async_runner_honours_an_already_raised_cancel() {
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let mut animator = Animator::seeded(["cat"], AnimatorConfig::default(), Some(3)).unwrap();
    let mut sink = RecordingSink::default();
    let summary = run_animation_async(&mut animator, &mut sink, rx).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.steps, 0);
    assert!(sink.writes().is_empty());
}
