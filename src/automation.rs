//! Browser and input automation boundary
//!
//! The mailer never drives the keyboard or clipboard itself. Every
//! UI-level primitive goes through the [`Automation`] trait: deep links
//! open in the default browser, input simulation is delegated to an
//! operator-supplied driver command (xdotool wrapper, osascript wrapper,
//! and so on). [`DryRun`] logs each step instead of performing it.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};

/// UI primitives the send operation is built from.
pub trait Automation {
    /// Open a chat deep link in the web client
    fn open_chat(&mut self, url: &str) -> Result<()>;
    /// Submit keypress
    fn press_enter(&mut self) -> Result<()>;
    /// Type one caption character
    fn type_char(&mut self, c: char) -> Result<()>;
    /// Line break inside a message (shift+enter)
    fn line_break(&mut self) -> Result<()>;
    /// Platform paste shortcut
    fn paste_clipboard(&mut self) -> Result<()>;
    /// Place an image file on the system clipboard
    fn copy_image(&mut self, path: &Path) -> Result<()>;
    /// Close the current chat tab
    fn close_tab(&mut self) -> Result<()>;
}

/// Open a URL in the default web browser.
pub fn open_in_browser(url: &str) -> Result<()> {
    open::that(url).map_err(|e| Error::BrowserError(e.to_string()))
}

/// Input driver that shells out to an external command for every
/// primitive: `<program> press-enter`, `<program> type-char <c>`,
/// `<program> line-break`, `<program> paste`, `<program> copy-image
/// <path>`, `<program> close-tab`. A non-zero exit is a send failure for
/// the current recipient only.
#[derive(Debug, Clone)]
pub struct ShellDriver {
    program: PathBuf,
}

impl ShellDriver {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn invoke(&self, args: &[&str]) -> Result<()> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| {
                Error::Automation(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::Automation(format!(
                "{} {} exited with {}: {}",
                self.program.display(),
                args.first().unwrap_or(&""),
                output.status,
                stderr.trim()
            )))
        }
    }
}

impl Automation for ShellDriver {
    fn open_chat(&mut self, url: &str) -> Result<()> {
        open_in_browser(url)
    }

    fn press_enter(&mut self) -> Result<()> {
        self.invoke(&["press-enter"])
    }

    fn type_char(&mut self, c: char) -> Result<()> {
        self.invoke(&["type-char", &c.to_string()])
    }

    fn line_break(&mut self) -> Result<()> {
        self.invoke(&["line-break"])
    }

    fn paste_clipboard(&mut self) -> Result<()> {
        self.invoke(&["paste"])
    }

    fn copy_image(&mut self, path: &Path) -> Result<()> {
        self.invoke(&["copy-image", &path.to_string_lossy()])
    }

    fn close_tab(&mut self) -> Result<()> {
        self.invoke(&["close-tab"])
    }
}

/// Logs every primitive instead of performing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl Automation for DryRun {
    fn open_chat(&mut self, url: &str) -> Result<()> {
        info!("dry-run: open chat {}", url);
        Ok(())
    }

    fn press_enter(&mut self) -> Result<()> {
        info!("dry-run: press enter");
        Ok(())
    }

    fn type_char(&mut self, c: char) -> Result<()> {
        info!("dry-run: type {:?}", c);
        Ok(())
    }

    fn line_break(&mut self) -> Result<()> {
        info!("dry-run: line break");
        Ok(())
    }

    fn paste_clipboard(&mut self) -> Result<()> {
        info!("dry-run: paste clipboard");
        Ok(())
    }

    fn copy_image(&mut self, path: &Path) -> Result<()> {
        info!("dry-run: copy image {}", path.display());
        Ok(())
    }

    fn close_tab(&mut self) -> Result<()> {
        info!("dry-run: close tab");
        Ok(())
    }
}
