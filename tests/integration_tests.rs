//! Integration tests for whatsapp_mailer library
//!
//! These tests verify the public API and module interactions.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use whatsapp_mailer::{
    config::{COUNTRY_CODE, LOCK_FILE, MIN_RAW_LINE_LEN, SECONDS_PER_MESSAGE, WEB_CLIENT_URL},
    contacts, Config, Delays, DispatchStats, Dispatcher, Error, MailingSession, MessageSender,
    MessageVariants, ObfuscationMode, Result, SendLock,
};

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::defaults();
    assert_eq!(config.country_code, COUNTRY_CODE);
    assert_eq!(config.web_url, WEB_CLIENT_URL);
    assert_eq!(config.lock_file, LOCK_FILE);
    assert!(!config.strict_validation);
}

#[test]
fn test_config_constants() {
    assert_eq!(COUNTRY_CODE, "+7");
    assert_eq!(MIN_RAW_LINE_LEN, 10);
    assert_eq!(SECONDS_PER_MESSAGE, 46);
}

// ============================================================================
// Normalizer Tests
// ============================================================================

#[test]
fn test_normalizer_reference_example() {
    let numbers = contacts::format_numbers("+7 (912) 345-6789\n", "+7", false);
    assert_eq!(numbers, vec!["+79123456789".to_string()]);
}

#[test]
fn test_normalizer_drops_short_lines() {
    let numbers = contacts::format_numbers("12345\n8 (912) 345-67-89\n", "+7", false);
    assert_eq!(numbers, vec!["+79123456789".to_string()]);
}

#[test]
fn test_normalizer_is_pure_over_file_content() {
    let mut file = NamedTempFile::with_suffix(".txt").expect("tempfile");
    writeln!(file, "+7 (912) 345-6789").expect("write");
    writeln!(file, "8 912 345 67 89").expect("write");

    let config = Config::defaults();
    let first = contacts::load_numbers(file.path(), &config).expect("first load");
    let second = contacts::load_numbers(file.path(), &config).expect("second load");
    assert_eq!(first, second);
}

#[test]
fn test_duration_estimate_strings() {
    assert_eq!(
        contacts::sending_time_str(10),
        "Прогнозируемое время рассылки: 7 мин"
    );
    assert_eq!(
        contacts::sending_time_str(100),
        "Прогнозируемое время рассылки: 1 ч 16 мин"
    );
}

// ============================================================================
// Obfuscation Tests
// ============================================================================

#[test]
fn test_transform_preserves_char_count() {
    let msg = "рассылка про хлеб и сахар";
    assert_eq!(
        whatsapp_mailer::transform(msg).chars().count(),
        msg.chars().count()
    );
}

#[test]
fn test_transform_empty_string() {
    assert_eq!(whatsapp_mailer::transform(""), "");
}

#[test]
fn test_variants_reset_mode_zero_probability_is_stable() {
    let mut variants = MessageVariants::new("охрана", ObfuscationMode::Reset, 0.0);
    assert_eq!(variants.next(), "охрана");
    assert_eq!(variants.next(), "охрана");
}

// ============================================================================
// Session & Dispatch Tests
// ============================================================================

/// Fails every send to numbers contained in `poison`.
#[derive(Default)]
struct FlakySender {
    poison: Vec<String>,
    visited: Vec<String>,
}

impl MessageSender for FlakySender {
    fn send_text(&mut self, number: &str, _message: &str) -> Result<()> {
        self.visited.push(number.to_string());
        if self.poison.iter().any(|p| p == number) {
            return Err(Error::Automation("page never settled".to_string()));
        }
        Ok(())
    }

    fn send_image(&mut self, receiver: &str, _image: &Path, _caption: &str) -> Result<()> {
        self.visited.push(receiver.to_string());
        Ok(())
    }

    fn confirm(&mut self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_full_run_from_numbers_file() {
    let mut file = NamedTempFile::with_suffix(".txt").expect("tempfile");
    writeln!(file, "+7 (912) 345-6701").expect("write");
    writeln!(file, "+7 (912) 345-6702").expect("write");
    writeln!(file, "+7 (912) 345-6703").expect("write");

    let config = Config::defaults();
    let mut session = MailingSession::new();
    session.set_message("привет");
    let count = session
        .load_recipients(file.path(), &config)
        .expect("load recipients");
    assert_eq!(count, 3);

    let sender = FlakySender {
        poison: vec!["+79123456702".to_string()],
        ..FlakySender::default()
    };
    let mut variants = MessageVariants::new(&session.message, ObfuscationMode::Reset, 0.5);
    let mut dispatcher = Dispatcher::new(sender, Delays::none());

    let stats = dispatcher.run(&session, &mut variants);
    assert_eq!(
        stats,
        DispatchStats {
            attempted: 3,
            sent: 2,
            failed: 1
        }
    );

    // The failing recipient never shortens the sequence
    let sender = dispatcher.into_inner();
    assert_eq!(sender.visited, session.recipients);
}

#[test]
fn test_send_lock_is_exclusive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mailer.lock");

    let _held = SendLock::acquire(&path).expect("first lock");
    assert!(matches!(SendLock::acquire(&path), Err(Error::SendLocked)));
}

#[test]
fn test_session_summary_after_load() {
    let mut file = NamedTempFile::with_suffix(".txt").expect("tempfile");
    for _ in 0..10 {
        writeln!(file, "+7 (912) 345-6789").expect("write");
    }

    let config = Config::defaults();
    let mut session = MailingSession::new();
    session
        .load_recipients(file.path(), &config)
        .expect("load recipients");

    let (count, estimate) = session.summary();
    assert_eq!(count, "Количество номеров: 10");
    assert_eq!(estimate, "Прогнозируемое время рассылки: 7 мин");
}

#[test]
fn test_attach_image_records_name() {
    let mut session = MailingSession::new();
    session.attach_image(PathBuf::from("ads/promo.jpg"));
    assert_eq!(session.image.expect("image").file_name, "promo.jpg");
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_error_variants_display() {
    let errors = vec![
        Error::CountryCodeMissing("89123456789".into()),
        Error::BadFileExtension("numbers.csv".into()),
        Error::BadImageExtension("photo.gif".into()),
        Error::SendLocked,
        Error::LockError("lock failed".into()),
        Error::Automation("driver died".into()),
        Error::BrowserError("no browser".into()),
        Error::ConfigError("bad yaml".into()),
        Error::InvalidArgument("bad arg".into()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "Error message should not be empty");
    }
}

#[test]
fn test_result_type_alias() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }

    fn returns_err() -> Result<i32> {
        Err(Error::SendLocked)
    }

    assert!(returns_ok().is_ok());
    assert!(returns_err().is_err());
}
