//! Send operation against the WhatsApp Web client
//!
//! Открывает чат по deep link и отправляет текст или картинку с подписью
//! через примитивы автоматизации.

use std::path::Path;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::automation::Automation;
use crate::config::Delays;
use crate::dispatch::MessageSender;
use crate::error::{Error, Result};

/// True when the destination carries a recognizable country code.
pub fn check_number(number: &str) -> bool {
    number.contains('+') || number.contains('_')
}

/// Group invite codes are plain alphanumeric strings; anything else must
/// be a dialable number.
pub fn is_group_id(receiver: &str) -> bool {
    !receiver.is_empty() && receiver.chars().all(|c| c.is_ascii_alphanumeric())
}

/// [`MessageSender`] implementation driving the web client through an
/// [`Automation`] driver. Synchronous; every wait is a blocking sleep.
pub struct WebSender<A> {
    automation: A,
    web_url: String,
    delays: Delays,
}

impl<A: Automation> WebSender<A> {
    pub fn new(automation: A, web_url: &str, delays: Delays) -> Self {
        Self {
            automation,
            web_url: web_url.trim_end_matches('/').to_string(),
            delays,
        }
    }

    fn text_url(&self, number: &str, message: &str) -> String {
        format!(
            "{}/send?phone={}&text={}",
            self.web_url,
            number,
            urlencoding::encode(message)
        )
    }

    fn group_url(&self, code: &str) -> String {
        format!("{}/accept?code={}", self.web_url, code)
    }

    fn sleep_secs(&self, secs: u64) {
        if secs > 0 {
            debug!("waiting {} s", secs);
            thread::sleep(Duration::from_secs(secs));
        }
    }

    fn sleep_range(&self, min: u64, max: u64) {
        if max == 0 {
            return;
        }
        let secs = rand::thread_rng().gen_range(min..=max);
        self.sleep_secs(secs);
    }

    /// Let the page settle, then close the chat tab.
    fn close_tab(&mut self) -> Result<()> {
        self.sleep_secs(self.delays.tab_close);
        self.automation.close_tab()
    }
}

impl<A: Automation> MessageSender for WebSender<A> {
    /// Open a chat preloaded with the message and submit it.
    fn send_text(&mut self, number: &str, message: &str) -> Result<()> {
        if !check_number(number) {
            return Err(Error::CountryCodeMissing(number.to_string()));
        }

        self.automation.open_chat(&self.text_url(number, message))?;
        self.sleep_range(self.delays.page_load_min, self.delays.page_load_max);
        self.automation.press_enter()?;
        self.close_tab()?;
        self.sleep_range(self.delays.post_send_min, self.delays.post_send_max);
        Ok(())
    }

    /// Open the chat, place the image on the clipboard, type the caption,
    /// paste and submit.
    ///
    /// A group receiver gets the caption typed character by character with
    /// line breaks translated to the in-message keystroke; a bare number
    /// already carries the caption in the deep link and only needs a
    /// placeholder keystroke to focus the input.
    fn send_image(&mut self, receiver: &str, image: &Path, caption: &str) -> Result<()> {
        if !is_group_id(receiver) && !check_number(receiver) {
            return Err(Error::CountryCodeMissing(receiver.to_string()));
        }

        let url = if check_number(receiver) {
            self.text_url(receiver, caption)
        } else {
            self.group_url(receiver)
        };
        self.automation.open_chat(&url)?;

        // Fixed settle for the page plus the rest of the media wait
        self.sleep_secs(self.delays.media_settle);
        self.sleep_secs(
            self.delays
                .media_wait
                .saturating_sub(self.delays.media_settle),
        );

        self.automation.copy_image(image)?;

        if !check_number(receiver) {
            for c in caption.chars() {
                if c == '\n' {
                    self.automation.line_break()?;
                } else {
                    self.automation.type_char(c)?;
                }
            }
        } else {
            self.automation.type_char(' ')?;
        }

        self.automation.paste_clipboard()?;
        self.sleep_range(self.delays.page_load_min, self.delays.page_load_max);
        self.automation.press_enter()?;
        self.sleep_range(self.delays.post_send_min, self.delays.post_send_max);
        self.close_tab()?;
        Ok(())
    }

    fn confirm(&mut self) -> Result<()> {
        self.automation.press_enter()
    }
}
