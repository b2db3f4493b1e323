//! Console keystroke sequences for the board's serial menu.
//!
//! The board exposes a text menu on the same port that carries waveform
//! frames. These commands replay the keystrokes an operator would type.
//! They are fire-and-forget: nothing is read back, the board's replies
//! simply show up as console text in the receive loop.
//!
//! # Menu Paths
//!
//! ```text
//! MainMenu             ESC ESC ESC ESC ESC
//! ToggleWaveformPrint  MainMenu, "2\r\n", "3\r\n"
//! FeedbackMessage(t)   MainMenu, "4\r\n", "4\r\n", "t\r\n"
//! ```

use std::io::Write;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;

/// Pause after every keystroke; the board's menu polls its UART slowly.
pub const KEYSTROKE_GAP: Duration = Duration::from_millis(100);

/// Escape presses needed to reach the main menu from any submenu.
const MAIN_MENU_ESCAPES: usize = 5;

const ESC: &[u8] = b"\x1b";

/// A command sent to the board's console menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Back out to the main menu.
    MainMenu,

    /// Toggle printing of the received waveform as frames.
    ToggleWaveformPrint,

    /// Ask the board to transmit a feedback message.
    FeedbackMessage(String),
}

impl ConsoleCommand {
    /// Keystroke writes making up this command, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavetap_serial::console::ConsoleCommand;
    ///
    /// let steps = ConsoleCommand::ToggleWaveformPrint.keystrokes();
    /// assert_eq!(steps.len(), 7);
    /// assert_eq!(steps[5], b"2\r\n");
    /// ```
    pub fn keystrokes(&self) -> Vec<Vec<u8>> {
        let mut steps: Vec<Vec<u8>> = (0..MAIN_MENU_ESCAPES).map(|_| ESC.to_vec()).collect();

        match self {
            Self::MainMenu => {}
            Self::ToggleWaveformPrint => {
                steps.push(b"2\r\n".to_vec());
                steps.push(b"3\r\n".to_vec());
            }
            Self::FeedbackMessage(text) => {
                steps.push(b"4\r\n".to_vec());
                steps.push(b"4\r\n".to_vec());
                steps.push(format!("{text}\r\n").into_bytes());
            }
        }

        steps
    }

    /// Write the command, pausing [`KEYSTROKE_GAP`] after each keystroke.
    pub fn send<W: Write>(&self, port: &mut W) -> Result<()> {
        self.send_with_gap(port, KEYSTROKE_GAP)
    }

    /// Write the command with a custom pause between keystrokes.
    pub fn send_with_gap<W: Write>(&self, port: &mut W, gap: Duration) -> Result<()> {
        info!("Sending console command: {}", self);

        for step in self.keystrokes() {
            port.write_all(&step)?;
            port.flush()?;
            debug!("Wrote keystroke {:?}", String::from_utf8_lossy(&step));
            if !gap.is_zero() {
                thread::sleep(gap);
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainMenu => write!(f, "main menu"),
            Self::ToggleWaveformPrint => write!(f, "toggle waveform print"),
            Self::FeedbackMessage(text) => write!(f, "feedback message {text:?}"),
        }
    }
}
