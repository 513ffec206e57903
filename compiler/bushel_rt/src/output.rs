//! Where `log` output goes.
//!
//! Hosts pick stdout, an in-memory buffer (tests, embedding editors) or
//! silence. The handler is shared by `Arc` so a host can keep a handle to
//! the buffer while the runtime writes to it.

use std::sync::Arc;

use parking_lot::Mutex;

pub enum OutputHandler {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl OutputHandler {
    /// Write one line.
    pub fn line(&self, message: &str) {
        match self {
            OutputHandler::Stdout => println!("{message}"),
            OutputHandler::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(message);
                buffer.push('\n');
            }
            OutputHandler::Silent => {}
        }
    }

    /// Everything captured so far; empty unless buffering.
    pub fn captured(&self) -> String {
        match self {
            OutputHandler::Buffer(buffer) => buffer.lock().clone(),
            OutputHandler::Stdout | OutputHandler::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let OutputHandler::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

impl std::fmt::Debug for OutputHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputHandler::Stdout => "OutputHandler::Stdout",
            OutputHandler::Buffer(_) => "OutputHandler::Buffer",
            OutputHandler::Silent => "OutputHandler::Silent",
        })
    }
}

pub type SharedOutput = Arc<OutputHandler>;

pub fn stdout_output() -> SharedOutput {
    Arc::new(OutputHandler::Stdout)
}

pub fn buffer_output() -> SharedOutput {
    Arc::new(OutputHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_output() -> SharedOutput {
    Arc::new(OutputHandler::Silent)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_lines() {
        let output = buffer_output();
        output.line("one");
        output.line("two");
        assert_eq!(output.captured(), "one\ntwo\n");
        output.clear();
        assert!(output.captured().is_empty());
    }

    #[test]
    fn silent_and_stdout_capture_nothing() {
        let silent = silent_output();
        silent.line("dropped");
        assert_eq!(silent.captured(), "");
        assert_eq!(stdout_output().captured(), "");
    }

    #[test]
    fn buffer_is_shared_across_threads() {
        let output = buffer_output();
        let writer = Arc::clone(&output);
        let handle = std::thread::spawn(move || {
            for _ in 0..50 {
                writer.line("a");
            }
        });
        for _ in 0..50 {
            output.line("b");
        }
        handle.join().unwrap();
        assert_eq!(output.captured().lines().count(), 100);
    }
}
