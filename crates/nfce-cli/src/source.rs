//! Stdin-backed scan source.
//!
//! Stands in for the camera widget: every non-empty line on stdin is
//! treated as one decoded QR payload, delivered in read order.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nfce_core::scanner::{DecodeHandler, ErrorHandler, ScanError, ScanEvent, ScanSource};

pub struct StdinSource {
    running: Arc<AtomicBool>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl ScanSource for StdinSource {
    fn start(
        &mut self,
        on_decoded: DecodeHandler,
        on_error: ErrorHandler,
    ) -> Result<(), ScanError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let running = Arc::clone(&self.running);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                match line {
                    Ok(line) => {
                        let payload = line.trim();
                        if !payload.is_empty() {
                            on_decoded(ScanEvent::new(payload));
                        }
                    }
                    Err(err) => {
                        on_error(ScanError::Other(err.to_string()));
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    fn stop(&mut self) {
        // The reader thread notices on its next line; a thread blocked on a
        // final read simply exits with the process.
        self.running.store(false, Ordering::SeqCst);
    }
}
