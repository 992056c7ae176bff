use std::time::Duration;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sink::TextSink;

pub const DEFAULT_MISTAKE_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    pub typing_ms_min: u64,
    pub typing_ms_max: u64,
    pub erasing_ms_min: u64,
    pub erasing_ms_max: u64,
    pub mistake_erasing_ms: u64,
    pub pause_after_phrase_ms: u64,
    pub delay_before_erase_ms: u64,
    pub start_delay_ms_min: u64,
    pub start_delay_ms_max: u64,
    pub mistake_probability: f64,
    pub realization_chars_min: u64,
    pub realization_chars_max: u64,
    pub mistake_chars: String,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            typing_ms_min: 30,
            typing_ms_max: 100,
            erasing_ms_min: 30,
            erasing_ms_max: 70,
            mistake_erasing_ms: 30,
            pause_after_phrase_ms: 1500,
            delay_before_erase_ms: 1000,
            start_delay_ms_min: 500,
            start_delay_ms_max: 2000,
            mistake_probability: 0.05,
            realization_chars_min: 1,
            realization_chars_max: 5,
            mistake_chars: DEFAULT_MISTAKE_CHARS.to_string(),
        }
    }
}

pub fn validate_config(cfg: &AnimatorConfig) -> Result<()> {
    ensure!(
        cfg.typing_ms_min <= cfg.typing_ms_max,
        "typing_ms_min must be <= typing_ms_max"
    );
    ensure!(
        cfg.erasing_ms_min <= cfg.erasing_ms_max,
        "erasing_ms_min must be <= erasing_ms_max"
    );
    ensure!(
        cfg.start_delay_ms_min <= cfg.start_delay_ms_max,
        "start_delay_ms_min must be <= start_delay_ms_max"
    );
    ensure!(
        cfg.realization_chars_min <= cfg.realization_chars_max,
        "realization_chars_min must be <= realization_chars_max"
    );

    ensure!(
        cfg.mistake_probability.is_finite(),
        "mistake_probability must be finite"
    );
    ensure!(
        (0.0..=1.0).contains(&cfg.mistake_probability),
        "mistake_probability must be between 0.0 and 1.0"
    );

    ensure!(
        !cfg.mistake_chars.is_empty(),
        "mistake_chars must contain at least one character"
    );

    Ok(())
}

/// Uniform integer in `min..=max`. Returns `min` when the range is empty.
pub fn random_int(rng: &mut impl Rng, min: u64, max: u64) -> u64 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Picks one character uniformly from `chars`.
///
/// Panics if `chars` is empty.
pub fn random_mistake_char(rng: &mut impl Rng, chars: &[char]) -> char {
    chars[random_int(rng, 0, chars.len() as u64 - 1) as usize]
}

/// Source of every random decision the animator makes.
pub trait Dice {
    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
    /// Uniform integer in `min..=max`.
    fn int_in(&mut self, min: u64, max: u64) -> u64;
    /// One character out of a non-empty set.
    fn pick(&mut self, chars: &[char]) -> char;
}

#[derive(Debug, Clone)]
pub struct RandomDice<R>(pub R);

impl<R: Rng> Dice for RandomDice<R> {
    fn chance(&mut self, probability: f64) -> bool {
        self.0.gen_bool(probability)
    }

    fn int_in(&mut self, min: u64, max: u64) -> u64 {
        random_int(&mut self.0, min, max)
    }

    fn pick(&mut self, chars: &[char]) -> char {
        random_mistake_char(&mut self.0, chars)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Typing,
    /// A wrong character sits at `mistake_index`; `countdown` more characters
    /// get typed before it is noticed.
    TypingMistake { mistake_index: usize, countdown: u64 },
    CorrectingMistake { mistake_index: usize },
    ErasingPhrase,
}

#[derive(Debug, Clone)]
pub struct Animator<D> {
    cfg: AnimatorConfig,
    phrases: Vec<Vec<char>>,
    mistake_chars: Vec<char>,
    dice: D,

    phrase_index: usize,
    cursor: usize,
    mode: Mode,
    shown: Vec<char>,

    dirty: bool,
    reset_pending: bool,
}

pub type SeededAnimator = Animator<RandomDice<StdRng>>;

impl SeededAnimator {
    /// Animator backed by `StdRng`, seeded when `seed` is given.
    pub fn seeded<I>(phrases: I, cfg: AnimatorConfig, seed: Option<u64>) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(phrases, cfg, RandomDice(rng))
    }
}

impl<D: Dice> Animator<D> {
    pub fn new<I>(phrases: I, cfg: AnimatorConfig, dice: D) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        validate_config(&cfg)?;

        let phrases: Vec<Vec<char>> = phrases
            .into_iter()
            .map(|p| p.as_ref().chars().collect())
            .collect();
        ensure!(!phrases.is_empty(), "phrase list must not be empty");

        let mistake_chars = cfg.mistake_chars.chars().collect();

        Ok(Self {
            cfg,
            phrases,
            mistake_chars,
            dice,
            phrase_index: 0,
            cursor: 0,
            mode: Mode::Typing,
            shown: Vec::new(),
            dirty: false,
            reset_pending: true,
        })
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.cfg
    }

    pub fn phrases(&self) -> Vec<String> {
        self.phrases.iter().map(|p| p.iter().collect()).collect()
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current_phrase(&self) -> String {
        self.phrases[self.phrase_index].iter().collect()
    }

    /// Text most recently written to the sink.
    pub fn shown(&self) -> String {
        self.shown.iter().collect()
    }

    /// Arms a full reset and returns how long to wait before the first step.
    ///
    /// The reset itself (clearing the sink, zeroing the cursor, choosing a
    /// random starting phrase) happens at the beginning of the next `step`.
    pub fn start(&mut self) -> Duration {
        self.reset_pending = true;
        let ms = self
            .dice
            .int_in(self.cfg.start_delay_ms_min, self.cfg.start_delay_ms_max);
        info!(delay_ms = ms, phrases = self.phrases.len(), "animation scheduled");
        Duration::from_millis(ms)
    }

    /// Performs one transition and returns the delay before the next one.
    pub fn step<S: TextSink + ?Sized>(&mut self, sink: &mut S) -> Result<Duration> {
        if self.reset_pending {
            self.reset(sink)?;
        }

        let ms = match self.mode {
            Mode::Typing => self.step_typing(),
            Mode::TypingMistake {
                mistake_index,
                countdown,
            } => self.step_typing_mistake(mistake_index, countdown),
            Mode::CorrectingMistake { mistake_index } => self.step_correcting(mistake_index),
            Mode::ErasingPhrase => self.step_erasing(),
        };

        if std::mem::take(&mut self.dirty) {
            sink.set_text(&self.shown())?;
        }

        Ok(Duration::from_millis(ms))
    }

    fn reset<S: TextSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.reset_pending = false;
        self.dirty = false;
        self.shown.clear();
        self.cursor = 0;
        self.mode = Mode::Typing;
        self.phrase_index = self.dice.int_in(0, self.phrases.len() as u64 - 1) as usize;

        info!(phrase_index = self.phrase_index, "animation started");
        sink.set_text("")
    }

    fn phrase_len(&self) -> usize {
        self.phrases[self.phrase_index].len()
    }

    fn typing_delay(&mut self) -> u64 {
        self.dice
            .int_in(self.cfg.typing_ms_min, self.cfg.typing_ms_max)
    }

    fn push(&mut self, c: char) {
        self.shown.push(c);
        self.cursor += 1;
        self.dirty = true;
    }

    fn truncate(&mut self, len: usize) {
        if len < self.shown.len() {
            self.shown.truncate(len);
            self.dirty = true;
        }
    }

    fn type_correct(&mut self) {
        let c = self.phrases[self.phrase_index][self.cursor];
        self.push(c);
    }

    fn step_typing(&mut self) -> u64 {
        if self.cursor >= self.phrase_len() {
            debug!(phrase_index = self.phrase_index, "phrase typed");
            self.mode = Mode::ErasingPhrase;
            return self.cfg.delay_before_erase_ms;
        }

        let real = self.phrases[self.phrase_index][self.cursor];
        let roll = self.dice.chance(self.cfg.mistake_probability);

        if roll && self.cursor > 0 && real.is_ascii_alphabetic() {
            let wrong = self.dice.pick(&self.mistake_chars);
            let mistake_index = self.cursor;
            let countdown = self.dice.int_in(
                self.cfg.realization_chars_min,
                self.cfg.realization_chars_max,
            );
            self.push(wrong);
            self.mode = Mode::TypingMistake {
                mistake_index,
                countdown,
            };
            debug!(mistake_index, %wrong, %real, countdown, "typed mistake");

            return self
                .dice
                .int_in(self.cfg.typing_ms_min / 2, self.cfg.typing_ms_max / 2);
        }

        self.type_correct();
        self.typing_delay()
    }

    fn step_typing_mistake(&mut self, mistake_index: usize, countdown: u64) -> u64 {
        if countdown > 0 {
            self.mode = Mode::TypingMistake {
                mistake_index,
                countdown: countdown - 1,
            };
            if self.cursor < self.phrase_len() {
                self.type_correct();
            }
            return self.typing_delay();
        }

        debug!(mistake_index, cursor = self.cursor, "mistake noticed");
        self.mode = Mode::CorrectingMistake { mistake_index };
        // The mistake itself advanced the cursor, so it is at least 1 here.
        self.cursor -= 1;
        self.cfg.mistake_erasing_ms
    }

    fn step_correcting(&mut self, mistake_index: usize) -> u64 {
        if self.cursor >= mistake_index {
            self.truncate(self.cursor);
            // Mistakes are never injected at index 0, so this cannot underflow.
            self.cursor -= 1;
            return self.cfg.mistake_erasing_ms;
        }

        let end = mistake_index + 1;
        self.shown.clear();
        self.shown
            .extend_from_slice(&self.phrases[self.phrase_index][..end]);
        self.cursor = end;
        self.dirty = true;
        self.mode = Mode::Typing;
        debug!(mistake_index, "mistake corrected");

        self.typing_delay()
    }

    fn step_erasing(&mut self) -> u64 {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.truncate(self.cursor);
            return self
                .dice
                .int_in(self.cfg.erasing_ms_min, self.cfg.erasing_ms_max);
        }

        self.mode = Mode::Typing;
        self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
        self.cursor = 0;
        debug!(phrase_index = self.phrase_index, "next phrase");
        self.cfg.pause_after_phrase_ms
    }
}
