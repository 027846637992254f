//! Busy indicator shown while a search is in flight.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const FRAME_INTERVAL_MS: u64 = 80;
const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner drawn on stderr from a background thread.
///
/// Stops on drop, so an early return or `?` cannot leave it spinning.
pub struct ProgressSpinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressSpinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn searching() -> Self {
        Self::new("Searching...")
    }

    /// No-op when already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = Arc::clone(&self.running);
        let message = self.message.clone();
        let clear_width = message.chars().count() + 2;

        self.handle = Some(thread::spawn(move || {
            let mut frame = 0;
            let mut stderr = io::stderr();
            while running.load(Ordering::SeqCst) {
                let _ = write!(stderr, "\r{} {}", FRAMES[frame], message);
                let _ = stderr.flush();
                frame = (frame + 1) % FRAMES.len();
                thread::sleep(Duration::from_millis(FRAME_INTERVAL_MS));
            }
            let _ = write!(stderr, "\r{:width$}\r", "", width = clear_width);
            let _ = stderr.flush();
        }));
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle() {
        let mut spinner = ProgressSpinner::searching();
        assert_eq!(spinner.message(), "Searching...");
        assert!(!spinner.is_running());

        spinner.start();
        assert!(spinner.is_running());
        spinner.start();

        spinner.stop();
        assert!(!spinner.is_running());
        spinner.stop();
    }

    #[test]
    fn test_spinner_stops_on_drop() {
        let running = {
            let mut spinner = ProgressSpinner::new("Working");
            spinner.start();
            Arc::clone(&spinner.running)
        };
        assert!(!running.load(Ordering::SeqCst));
    }
}
