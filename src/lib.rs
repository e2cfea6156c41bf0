//! WhatsApp Web Bulk Mailer Library
//!
//! This library provides tools to:
//! - Read phone-number lists from text files and normalize them
//! - Estimate the total duration of a mailing run
//! - Vary message text per recipient with confusable-character substitution
//! - Run a sequential, paced dispatch loop with skip-and-continue errors
//! - Send text or image-with-caption through the WhatsApp Web client,
//!   with all UI automation behind a narrow driver boundary

pub mod automation;
pub mod config;
pub mod contacts;
pub mod dispatch;
pub mod error;
pub mod obfuscate;
pub mod session;
pub mod web;

// Re-export common types
pub use config::{Config, Delays};
pub use dispatch::{DispatchStats, Dispatcher, MessageSender};
pub use error::{Error, Result};
pub use obfuscate::{transform, MessageVariants, ObfuscationMode};
pub use session::{ImageAttachment, MailingSession, SendLock};
pub use web::WebSender;
