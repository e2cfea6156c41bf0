//! Contact list normalizer
//!
//! Чтение номеров из файла и приведение их к формату +7XXXXXXXXXX

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::config::{Config, MIN_RAW_LINE_LEN, SECONDS_PER_MESSAGE};
use crate::error::{Error, Result};

/// Separators stripped from a raw number line before reformatting
static STRIP_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[()\- "\n+]"#).expect("static strip pattern"));

/// Transform raw number lines to the canonical dialable format.
///
/// A line survives only if its raw length (newline included) exceeds
/// [`MIN_RAW_LINE_LEN`]. Surviving lines are stripped of separators, lose
/// their leading trunk digit and gain the country-code prefix. The length
/// gate intentionally runs on the raw line, before cleaning.
pub fn format_numbers(raw: &str, country_code: &str, strict: bool) -> Vec<String> {
    raw.split_inclusive('\n')
        .filter(|line| line.chars().count() > MIN_RAW_LINE_LEN)
        .map(|line| {
            let cleaned = STRIP_CHARS.replace_all(line, "");
            let tail: String = cleaned.chars().skip(1).collect();
            format!("{}{}", country_code, tail)
        })
        .filter(|number| !strict || is_dialable(number, country_code))
        .collect()
}

/// Post-clean validation used in `strict` mode: exactly ten subscriber
/// digits after the country code.
pub fn is_dialable(number: &str, country_code: &str) -> bool {
    match number.strip_prefix(country_code) {
        Some(subscriber) => {
            subscriber.len() == 10 && subscriber.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Read and normalize numbers from a user-selected file.
///
/// A wrong extension is logged but the file is still read — the original
/// behavior is to continue with whatever the read yields.
pub fn load_numbers(path: &Path, config: &Config) -> Result<Vec<String>> {
    if !path.to_string_lossy().ends_with(".txt") {
        error!(
            "{}",
            Error::BadFileExtension(path.to_string_lossy().into_owned())
        );
    }

    let raw = fs::read_to_string(path)?;
    Ok(format_numbers(
        &raw,
        &config.country_code,
        config.strict_validation,
    ))
}

/// "Количество номеров: N" display line.
pub fn count_numbers_str(count: usize) -> String {
    format!("Количество номеров: {}", count)
}

/// Estimated total mailing duration, "H ч M мин" with hours omitted
/// when zero.
pub fn sending_time_str(count_numbers: usize) -> String {
    let mut out = String::from("Прогнозируемое время рассылки: ");
    let mins = count_numbers as u64 * SECONDS_PER_MESSAGE / 60;
    let (hours, mins) = (mins / 60, mins % 60);
    if hours > 0 {
        out.push_str(&format!("{} ч ", hours));
    }
    out.push_str(&format!("{} мин", mins));
    out
}
