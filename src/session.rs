//! Mailing session state and locking
//!
//! Provides:
//! - An explicit session struct holding recipients, message and image
//! - File-based locking to prevent two mailings sharing one browser session

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::error;

use crate::config::Config;
use crate::contacts;
use crate::error::{Error, Result};

/// Image sent with every message of the run, caption taken from the
/// message template.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub file_name: String,
}

/// State of one mailing run.
///
/// The original kept all of this on a long-lived UI object; holding it in
/// an explicit struct lets the normalizer and the dispatch loop run
/// headless.
#[derive(Debug, Clone, Default)]
pub struct MailingSession {
    pub recipients: Vec<String>,
    pub message: String,
    pub image: Option<ImageAttachment>,
}

impl MailingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and normalize the recipient list, replacing any previous one.
    /// Returns the new recipient count.
    pub fn load_recipients(&mut self, path: &Path, config: &Config) -> Result<usize> {
        self.recipients = contacts::load_numbers(path, config)?;
        Ok(self.recipients.len())
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    /// Read the message template from a file.
    pub fn message_from_file(&mut self, path: &Path) -> Result<()> {
        self.message = std::fs::read_to_string(path)?;
        Ok(())
    }

    /// Attach an image to the run. A wrong extension is logged but the
    /// attachment is kept, matching the original degraded-continue policy.
    pub fn attach_image(&mut self, path: PathBuf) {
        let name = path.to_string_lossy().into_owned();
        if ![".jpeg", ".jpg", ".png"].iter().any(|ext| name.ends_with(ext)) {
            error!("{}", Error::BadImageExtension(name));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.image = Some(ImageAttachment { path, file_name });
    }

    /// Count and duration display lines for the loaded list.
    pub fn summary(&self) -> (String, String) {
        (
            contacts::count_numbers_str(self.recipients.len()),
            contacts::sending_time_str(self.recipients.len()),
        )
    }
}

/// Lock guard that ensures exclusive access to the web client session
/// and the system clipboard for the duration of a run.
pub struct SendLock {
    lock_file: Option<File>,
    path: PathBuf,
}

impl SendLock {
    /// Acquire an exclusive lock on the given lock file.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                lock_file: Some(lock_file),
                path,
            }),
            Err(_) => {
                eprintln!(
                    r#"
⚠️  ОШИБКА: Рассылка уже запущена другим процессом!

Браузерная сессия и буфер обмена выдерживают только одну рассылку за раз.
Подождите, пока завершится другой запуск, и попробуйте снова.
"#
                );
                Err(Error::SendLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(ref file) = self.lock_file {
            let _ = file.unlock();
        }
        self.lock_file = None;
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for SendLock {
    fn drop(&mut self) {
        self.release();
    }
}
