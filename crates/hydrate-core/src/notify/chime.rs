use std::io::Write;

use crate::error::DispatchError;

/// Audible cue played on every reminder.
pub trait Chime: Send {
    fn play(&self) -> Result<(), DispatchError>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> Result<(), DispatchError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| DispatchError::Playback(e.to_string()))
    }
}
