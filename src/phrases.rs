use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{ensure, Context, Result};

pub const DEFAULT_PHRASES: [&str; 10] = [
    "Full of comments explaining my questionable decisions",
    "Not Designed to be easily understood by future me (and others)",
    "Currently battling an inexplicable memory leak",
    "Written to solve a very specific, niche problem",
    "Probably going to break with the next minor update",
    "A testament to the power of copy-pasting from the internet",
    "The reason I always have a backup plan",
    "Optimized for human readability, not always machine speed",
    "Completely dependent on obscure third-party libraries",
    "Totally not written using AI",
];

pub fn default_phrases() -> Vec<String> {
    DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect()
}

/// One phrase per non-blank line.
pub fn parse_phrases(text: &str) -> Result<Vec<String>> {
    let phrases: Vec<String> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    ensure!(!phrases.is_empty(), "no phrases found (expected one per line)");
    Ok(phrases)
}

/// Reads phrases from a file, or from stdin when `path` is `-`.
pub fn load_phrases(path: &Path) -> Result<Vec<String>> {
    let text = if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };

    parse_phrases(&text).with_context(|| format!("invalid phrase list {}", path.display()))
}
