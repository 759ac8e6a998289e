#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use delivery::{Deliver, DeliveryError, DeliveryStatus};
use fimg::Terminal;
use tempfile::TempDir;

/// In-memory terminal that replays scripted key bytes and records output.
#[derive(Default)]
pub struct ScriptedTerminal {
    pub keys: VecDeque<u8>,
    pub output: String,
    pub raw: bool,
    pub raw_enables: usize,
    pub restores: usize,
    pub columns: Option<u16>,
    pub not_a_tty: bool,
}

impl ScriptedTerminal {
    pub fn with_keys(keys: &[u8]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if self.not_a_tty {
            return Err(io::Error::from_raw_os_error(libc::ENOTTY));
        }
        self.raw = true;
        self.raw_enables += 1;
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        self.raw = false;
        self.restores += 1;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.keys.pop_front())
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        assert!(!self.raw, "output written while raw mode was held");
        self.output.push_str(data);
        Ok(())
    }

    fn columns(&self) -> u16 {
        self.columns.unwrap_or(80)
    }
}

/// Records every delivery; handles listed in `fail` are rejected.
#[derive(Default)]
pub struct RecordingDelivery {
    pub calls: RefCell<Vec<(String, String)>>,
    pub fail: Vec<String>,
}

impl Deliver for RecordingDelivery {
    fn deliver(&self, handle: &str, message: &str) -> Result<DeliveryStatus, DeliveryError> {
        self.calls
            .borrow_mut()
            .push((handle.to_string(), message.to_string()));
        if self.fail.iter().any(|h| h == handle) {
            return Err(DeliveryError::Rejected {
                handle: handle.to_string(),
                status: "exit_code=1".to_string(),
                detail: "ERROR: not registered".to_string(),
            });
        }
        Ok(DeliveryStatus::new("iMessage"))
    }
}

pub fn roster_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    for (name, contents) in files {
        write_roster(dir.path(), name, contents);
    }
    dir
}

pub fn write_roster(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("roster should be written");
}
