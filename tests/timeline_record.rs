use pretty_assertions::assert_eq;

use typewriter::animator::{Animator, AnimatorConfig};
use typewriter::model::{Frame, Timeline, TIMELINE_VERSION};
use typewriter::playback::{play_timeline, Scheduler, VirtualClock};
use typewriter::sim::{record, stats};
use typewriter::sink::RecordingSink;

fn record_seeded(seed: u64, steps: u64) -> Timeline {
    let cfg = AnimatorConfig {
        mistake_probability: 0.1,
        ..Default::default()
    };
    let mut animator = Animator::seeded(["The quick brown fox", "jumps"], cfg, Some(seed)).unwrap();
    record(&mut animator, steps, Some(seed)).unwrap()
}

#[test]
fn recording_is_reproducible_for_a_seed() {
    let a = record_seeded(77, 300);
    let b = record_seeded(77, 300);

    assert_eq!(a, b);
    assert_eq!(a.version, TIMELINE_VERSION);
    assert_eq!(a.config.seed, Some(77));
    assert_eq!(a.config.phrases, vec!["The quick brown fox", "jumps"]);
}

#[test]
fn recording_starts_with_the_start_delay_then_clears_the_text() {
    let timeline = record_seeded(1, 10);

    let Frame::Wait { ms } = &timeline.frames[0] else {
        panic!("expected the start delay first, got {:?}", timeline.frames[0]);
    };
    assert!((500..=2000).contains(ms));
    assert_eq!(
        timeline.frames[1],
        Frame::Show {
            text: String::new()
        }
    );
}

#[test]
fn stats_count_updates_and_waits() {
    let timeline = record_seeded(3, 200);
    let s = stats(&timeline);

    let shows = timeline
        .frames
        .iter()
        .filter(|f| matches!(f, Frame::Show { .. }))
        .count();
    let waits: u64 = timeline
        .frames
        .iter()
        .map(|f| match f {
            Frame::Wait { ms } => *ms,
            Frame::Show { .. } => 0,
        })
        .sum();

    assert_eq!(s.frames, timeline.frames.len());
    assert_eq!(s.text_updates, shows);
    assert_eq!(s.total_wait_ms, waits);
}

#[test]
fn replay_reproduces_every_text_update() {
    let timeline = record_seeded(21, 250);
    let mut sink = RecordingSink::default();
    let mut clock = VirtualClock::default();

    let completed = play_timeline(&timeline, &mut sink, &mut clock).unwrap();
    assert!(completed);

    let expected: Vec<String> = timeline
        .frames
        .iter()
        .filter_map(|f| match f {
            Frame::Show { text } => Some(text.clone()),
            Frame::Wait { .. } => None,
        })
        .collect();
    assert_eq!(sink.into_writes(), expected);
    assert_eq!(
        clock.elapsed().as_millis() as u64,
        stats(&timeline).total_wait_ms
    );
}

struct CancelAfter(usize);

impl Scheduler for CancelAfter {
    fn wait(&mut self, _delay: std::time::Duration) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        true
    }
}

#[test]
fn replay_stops_when_cancelled() {
    let timeline = record_seeded(4, 100);
    let mut sink = RecordingSink::default();

    let completed = play_timeline(&timeline, &mut sink, &mut CancelAfter(1)).unwrap();

    assert!(!completed);
    assert!(sink.writes().len() < stats(&timeline).text_updates);
}

#[test]
fn frames_serialize_with_a_type_tag() {
    let wait = serde_json::to_value(Frame::Wait { ms: 40 }).unwrap();
    let show = serde_json::to_value(Frame::Show {
        text: "ab".to_string(),
    })
    .unwrap();

    assert_eq!(wait, serde_json::json!({ "type": "wait", "ms": 40 }));
    assert_eq!(show, serde_json::json!({ "type": "show", "text": "ab" }));

    let timeline = record_seeded(8, 50);
    let json = serde_json::to_string(&timeline).unwrap();
    let parsed: Timeline = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, timeline);
}

#[test]
fn recorded_config_reproduces_a_custom_timed_run() {
    let cfg = AnimatorConfig {
        typing_ms_min: 5,
        typing_ms_max: 9,
        erasing_ms_min: 3,
        erasing_ms_max: 4,
        pause_after_phrase_ms: 250,
        start_delay_ms_min: 0,
        start_delay_ms_max: 0,
        mistake_probability: 0.2,
        ..Default::default()
    };
    let mut animator = Animator::seeded(["alpha beta", "gamma"], cfg.clone(), Some(42)).unwrap();
    let original = record(&mut animator, 200, Some(42)).unwrap();

    assert_eq!(original.config.animator, cfg);

    let json = serde_json::to_string(&original).unwrap();
    let parsed: Timeline = serde_json::from_str(&json).unwrap();

    let mut rebuilt = Animator::seeded(
        &parsed.config.phrases,
        parsed.config.animator.clone(),
        parsed.config.seed,
    )
    .unwrap();
    let again = record(&mut rebuilt, 200, parsed.config.seed).unwrap();

    assert_eq!(again, original);
}

#[test]
fn timelines_from_another_version_are_rejected() {
    let mut animator = Animator::seeded(["hi"], AnimatorConfig::default(), Some(1)).unwrap();
    let mut timeline = record(&mut animator, 5, Some(1)).unwrap();
    timeline.ensure_supported().unwrap();

    timeline.version = TIMELINE_VERSION + 1;
    let err = timeline.ensure_supported().unwrap_err();
    assert!(err.to_string().contains("unsupported timeline version"));
}
