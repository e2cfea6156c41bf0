//! Sequential dispatch loop
//!
//! Последовательная рассылка сообщений по списку номеров

use std::path::Path;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{error, info};

use crate::config::Delays;
use crate::error::Result;
use crate::obfuscate::MessageVariants;
use crate::session::MailingSession;

/// Narrow send interface consumed by the loop. The production
/// implementation is [`crate::web::WebSender`]; tests supply a fake.
pub trait MessageSender {
    /// Deliver a text message to one number
    fn send_text(&mut self, number: &str, message: &str) -> Result<()>;
    /// Deliver an image with a caption to one number or group
    fn send_image(&mut self, receiver: &str, image: &Path, caption: &str) -> Result<()>;
    /// Extra submit keypress fired right after a text send
    fn confirm(&mut self) -> Result<()>;
}

/// Outcome counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Per-recipient send controller: strictly sequential, one send at a time.
pub struct Dispatcher<S> {
    sender: S,
    delays: Delays,
}

impl<S: MessageSender> Dispatcher<S> {
    pub fn new(sender: S, delays: Delays) -> Self {
        Self { sender, delays }
    }

    /// Attempt one send per recipient, in list order.
    ///
    /// The message is re-derived from the variants source before every
    /// send. A failed send is logged and skipped; the loop always visits
    /// the whole list and produces exactly one log entry per recipient.
    pub fn run(
        &mut self,
        session: &MailingSession,
        variants: &mut MessageVariants,
    ) -> DispatchStats {
        info!("Start sending messages");

        let mut stats = DispatchStats::default();
        for number in &session.recipients {
            stats.attempted += 1;
            let message = variants.next();

            match self.send_one(number, &message, session) {
                Ok(()) => {
                    info!("Send message to number: {}", number);
                    stats.sent += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    fn send_one(&mut self, number: &str, message: &str, session: &MailingSession) -> Result<()> {
        match &session.image {
            Some(image) => self.sender.send_image(number, &image.path, message),
            None => {
                self.sender.send_text(number, message)?;
                self.sender.confirm()?;
                self.pause_between_sends();
                Ok(())
            }
        }
    }

    /// Random pause after a text send, throttling the overall rate.
    fn pause_between_sends(&self) {
        if self.delays.between_max == 0 {
            return;
        }
        let secs = rand::thread_rng().gen_range(self.delays.between_min..=self.delays.between_max);
        thread::sleep(Duration::from_secs(secs));
    }

    pub fn into_inner(self) -> S {
        self.sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::obfuscate::ObfuscationMode;
    use crate::session::ImageAttachment;
    use std::path::PathBuf;

    #[derive(Default)]
    struct MockSender {
        fail_on: Option<usize>,
        sends: Vec<String>,
        messages: Vec<String>,
        confirms: usize,
    }

    impl MockSender {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_on: Some(index),
                ..Self::default()
            }
        }

        fn record(&mut self, kind: &str, to: &str, message: &str) -> Result<()> {
            let index = self.sends.len();
            self.sends.push(format!("{}:{}", kind, to));
            self.messages.push(message.to_string());
            if self.fail_on == Some(index) {
                return Err(Error::Automation("driver exploded".to_string()));
            }
            Ok(())
        }
    }

    impl MessageSender for MockSender {
        fn send_text(&mut self, number: &str, message: &str) -> Result<()> {
            self.record("text", number, message)
        }

        fn send_image(&mut self, receiver: &str, _image: &Path, caption: &str) -> Result<()> {
            self.record("image", receiver, caption)
        }

        fn confirm(&mut self) -> Result<()> {
            self.confirms += 1;
            Ok(())
        }
    }

    fn session_with_numbers(count: usize) -> MailingSession {
        let mut session = MailingSession::new();
        session.recipients = (0..count).map(|i| format!("+7912345678{}", i)).collect();
        session.set_message("привет");
        session
    }

    fn variants_for(session: &MailingSession) -> MessageVariants {
        MessageVariants::new(&session.message, ObfuscationMode::Reset, 0.0)
    }

    #[test]
    fn failure_mid_list_does_not_shorten_the_sequence() {
        let session = session_with_numbers(5);
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::failing_at(2), Delays::none());

        let stats = dispatcher.run(&session, &mut variants);
        assert_eq!(stats.attempted, 5);
        assert_eq!(stats.sent, 4);
        assert_eq!(stats.failed, 1);

        let sender = dispatcher.into_inner();
        assert_eq!(sender.sends.len(), 5);
    }

    #[test]
    fn recipients_are_visited_in_list_order() {
        let session = session_with_numbers(3);
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::default(), Delays::none());

        dispatcher.run(&session, &mut variants);

        let sender = dispatcher.into_inner();
        let expected: Vec<String> = session
            .recipients
            .iter()
            .map(|n| format!("text:{}", n))
            .collect();
        assert_eq!(sender.sends, expected);
    }

    #[test]
    fn text_sends_are_confirmed_once_each() {
        let session = session_with_numbers(4);
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::failing_at(1), Delays::none());

        dispatcher.run(&session, &mut variants);

        // The failed send never reaches the confirm keypress
        let sender = dispatcher.into_inner();
        assert_eq!(sender.confirms, 3);
    }

    #[test]
    fn attached_image_switches_to_caption_sends() {
        let mut session = session_with_numbers(2);
        session.image = Some(ImageAttachment {
            path: PathBuf::from("promo.png"),
            file_name: "promo.png".to_string(),
        });
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::default(), Delays::none());

        let stats = dispatcher.run(&session, &mut variants);
        assert_eq!(stats.sent, 2);

        let sender = dispatcher.into_inner();
        assert!(sender.sends.iter().all(|s| s.starts_with("image:")));
        assert_eq!(sender.confirms, 0);
    }

    #[test]
    fn message_is_rederived_for_every_recipient() {
        let session = session_with_numbers(3);
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::default(), Delays::none());

        dispatcher.run(&session, &mut variants);

        // Probability 0 keeps every derived message equal to the template
        let sender = dispatcher.into_inner();
        assert_eq!(sender.messages, vec!["привет".to_string(); 3]);
    }

    #[test]
    fn empty_recipient_list_is_a_noop() {
        let session = MailingSession::new();
        let mut variants = variants_for(&session);
        let mut dispatcher = Dispatcher::new(MockSender::default(), Delays::none());

        let stats = dispatcher.run(&session, &mut variants);
        assert_eq!(stats, DispatchStats::default());
    }
}
