use std::fs;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use typewriter::animator::{Animator, AnimatorConfig, SeededAnimator};
use typewriter::model::Timeline;
use typewriter::phrases::{default_phrases, load_phrases};
use typewriter::playback::{play_timeline, run_animation, ThreadScheduler};
use typewriter::sim;
use typewriter::sink::TerminalSink;

#[derive(Debug, Args, Clone)]
struct AnimationArgs {
    /// Phrase list file (one phrase per line), or '-' for stdin.
    ///
    /// Defaults to the built-in rotation.
    #[arg(long, value_name = "PATH")]
    phrases: Option<PathBuf>,

    /// Optional RNG seed (for reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Mistake probability per typed character (0.0-1.0).
    ///
    /// Set to 0 for clean typing with no typos.
    #[arg(long, default_value_t = 0.05)]
    mistake_rate: f64,

    /// Fastest delay between typed characters (ms)
    #[arg(long, default_value_t = 30)]
    typing_ms_min: u64,

    /// Slowest delay between typed characters (ms)
    #[arg(long, default_value_t = 100)]
    typing_ms_max: u64,

    /// Pause after a phrase is erased, before the next one (ms)
    #[arg(long, default_value_t = 1500)]
    pause_ms: u64,

    /// Begin immediately instead of after the random start delay
    #[arg(long)]
    no_start_delay: bool,
}

#[derive(Debug, Parser)]
#[command(name = "typewriter")]
#[command(about = "Human-like typing animation for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Animate the phrases live in this terminal
    Run {
        #[command(flatten)]
        animation: AnimationArgs,

        /// Stop after this many steps (runs until Ctrl+C otherwise)
        #[arg(long)]
        steps: Option<u64>,

        /// Do not draw a caret after the text
        #[arg(long)]
        no_caret: bool,
    },

    /// Record a run to a timeline (JSON) without waiting in real time
    Record {
        #[command(flatten)]
        animation: AnimationArgs,

        /// Number of animation steps to record
        #[arg(long, default_value_t = 500)]
        steps: u64,

        /// Output timeline file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Replay a recorded timeline in this terminal
    Play {
        /// Timeline file (JSON)
        #[arg(long, value_name = "PATH")]
        timeline: PathBuf,

        /// Do not draw a caret after the text
        #[arg(long)]
        no_caret: bool,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .context("failed to install Ctrl+C handler")?;
    }
    Ok(stop)
}

fn build_config(args: &AnimationArgs) -> AnimatorConfig {
    let mut cfg = AnimatorConfig {
        mistake_probability: args.mistake_rate,
        typing_ms_min: args.typing_ms_min,
        typing_ms_max: args.typing_ms_max,
        pause_after_phrase_ms: args.pause_ms,
        ..Default::default()
    };
    if args.no_start_delay {
        cfg.start_delay_ms_min = 0;
        cfg.start_delay_ms_max = 0;
    }
    cfg
}

fn build_animator(args: &AnimationArgs) -> Result<SeededAnimator> {
    let phrases = match &args.phrases {
        Some(path) => load_phrases(path)?,
        None => default_phrases(),
    };
    Animator::seeded(phrases, build_config(args), args.seed)
}

fn write_output(path: &PathBuf, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            animation,
            steps,
            no_caret,
        } => {
            let mut animator = build_animator(&animation)?;
            let stop = install_stop_handler()?;
            let mut scheduler = ThreadScheduler::new(stop);
            let mut sink = TerminalSink::stdout(!no_caret);

            eprintln!(
                "Animating {} phrases. Press Ctrl+C to stop.",
                animator.phrases().len()
            );

            let summary = run_animation(&mut animator, &mut sink, &mut scheduler, steps)?;
            sink.finish()?;

            eprintln!(
                "Stopped after {} steps (~{:.1} s).",
                summary.steps,
                summary.elapsed.as_secs_f64()
            );
        }
        Command::Record {
            animation,
            steps,
            output,
        } => {
            let mut animator = build_animator(&animation)?;
            let timeline = sim::record(&mut animator, steps, animation.seed)?;

            let stats = sim::stats(&timeline);
            eprintln!(
                "Recorded: {} frames, {} text updates, ~{:.1} min",
                stats.frames,
                stats.text_updates,
                (stats.total_wait_ms as f64) / 1000.0 / 60.0
            );

            let json =
                serde_json::to_string_pretty(&timeline).context("failed to serialize timeline")?;
            if let Some(out) = output {
                write_output(&out, &json)?;
            } else {
                println!("{json}");
            }
        }
        Command::Play { timeline, no_caret } => {
            let json = fs::read_to_string(&timeline)
                .with_context(|| format!("failed to read {}", timeline.display()))?;
            let timeline: Timeline =
                serde_json::from_str(&json).context("failed to parse timeline JSON")?;

            timeline.ensure_supported()?;

            let stats = sim::stats(&timeline);
            eprintln!(
                "Playing: {} frames, ~{:.1} min",
                stats.frames,
                (stats.total_wait_ms as f64) / 1000.0 / 60.0
            );

            let stop = install_stop_handler()?;
            let mut scheduler = ThreadScheduler::new(stop);
            let mut sink = TerminalSink::stdout(!no_caret);

            let completed = play_timeline(&timeline, &mut sink, &mut scheduler)?;
            sink.finish()?;

            if !completed {
                eprintln!("Aborted.");
                return Err(anyhow!("aborted"));
            }
        }
    }

    Ok(())
}
