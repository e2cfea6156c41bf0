//! Message obfuscation transform
//!
//! Замена похожих символов для повышения уникальности сообщений

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;

/// Cyrillic letters and their visually identical Latin counterparts
static SUB_LETTERS: LazyLock<HashMap<char, char>> = LazyLock::new(|| {
    HashMap::from([
        ('а', 'a'),
        ('е', 'e'),
        ('с', 'c'),
        ('р', 'p'),
        ('у', 'y'),
        ('о', 'o'),
        ('х', 'x'),
    ])
});

/// Replace confusable symbols in a message to increase its uniqueness.
///
/// Each character found in the substitution table is replaced with its
/// counterpart independently with probability 0.5; everything else passes
/// through unchanged. Draws fresh randomness on every call — output is
/// intentionally not reproducible.
pub fn transform(msg: &str) -> String {
    transform_with(msg, &mut rand::thread_rng(), 0.5)
}

/// Same as [`transform`] with an explicit RNG and substitution probability.
pub fn transform_with<R: Rng>(msg: &str, rng: &mut R, probability: f64) -> String {
    msg.chars()
        .map(|sym| match SUB_LETTERS.get(&sym) {
            Some(&sub) if rng.gen::<f64>() < probability => sub,
            _ => sym,
        })
        .collect()
}

/// Whether the template is re-obfuscated from the original before every
/// send, or each send further mutates the previous output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObfuscationMode {
    /// Derive every message from the untouched template
    #[default]
    Reset,
    /// Reassign the template to each obfuscated value (legacy behavior)
    Compound,
}

impl FromStr for ObfuscationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reset" => Ok(ObfuscationMode::Reset),
            "compound" => Ok(ObfuscationMode::Compound),
            other => Err(format!("unknown obfuscation mode: {}", other)),
        }
    }
}

/// Per-recipient message source for the dispatch loop.
#[derive(Debug, Clone)]
pub struct MessageVariants {
    original: String,
    current: String,
    mode: ObfuscationMode,
    probability: f64,
}

impl MessageVariants {
    pub fn new(template: &str, mode: ObfuscationMode, probability: f64) -> Self {
        Self {
            original: template.to_string(),
            current: template.to_string(),
            mode,
            probability,
        }
    }

    /// The untouched template.
    pub fn template(&self) -> &str {
        &self.original
    }

    /// Produce the message for the next recipient.
    pub fn next(&mut self) -> String {
        self.next_with(&mut rand::thread_rng())
    }

    pub fn next_with<R: Rng>(&mut self, rng: &mut R) -> String {
        match self.mode {
            ObfuscationMode::Reset => transform_with(&self.original, rng, self.probability),
            ObfuscationMode::Compound => {
                self.current = transform_with(&self.current, rng, self.probability);
                self.current.clone()
            }
        }
    }
}
