use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::{Deliver, DeliveryError, DeliveryStatus};

pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
const OSASCRIPT: &str = "osascript";

/// Sends through Messages.app by running `osascript <script> <handle> <message>`.
///
/// The script prints the service it used on success, or a line starting with
/// `ERROR` when Messages refused the buddy.
#[derive(Debug, Clone)]
pub struct AppleScriptDelivery {
    program: String,
    script_path: PathBuf,
    timeout_secs: u64,
}

impl AppleScriptDelivery {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            program: OSASCRIPT.to_string(),
            script_path: script_path.into(),
            timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
        }
    }

    /// Replace the interpreter, mostly so tests can run a shell stub.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs.max(1);
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

impl Deliver for AppleScriptDelivery {
    fn deliver(&self, handle: &str, message: &str) -> Result<DeliveryStatus, DeliveryError> {
        if !self.script_path.exists() {
            return Err(DeliveryError::ScriptMissing {
                path: self.script_path.clone(),
            });
        }

        let mut child = Command::new(&self.program)
            .arg(&self.script_path)
            .arg(handle)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| DeliveryError::spawn(&self.program, err))?;

        // Drain both pipes while waiting so a chatty script cannot block on a full pipe.
        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());

        let status = match child.wait_timeout(Duration::from_secs(self.timeout_secs)) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DeliveryError::TimedOut {
                    handle: handle.to_string(),
                    timeout_secs: self.timeout_secs,
                });
            }
            Err(err) => {
                let _ = child.kill();
                return Err(DeliveryError::wait(&self.program, err));
            }
        };

        let stdout = join_pipe_reader(stdout_reader);
        let stderr = join_pipe_reader(stderr_reader);
        let stdout = String::from_utf8_lossy(&stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        let detail = if stdout.is_empty() { stderr } else { stdout };

        // Messages reports the service it used; silence means nothing was sent.
        if status.success() && !detail.is_empty() && !detail.starts_with("ERROR") {
            tracing::debug!(handle, detail = %detail, "delivered");
            Ok(DeliveryStatus::new(detail))
        } else {
            Err(DeliveryError::Rejected {
                handle: handle.to_string(),
                status: format_exit_status(status),
                detail,
            })
        }
    }
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        bytes
    }))
}

fn join_pipe_reader(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn format_exit_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit_code={code}"),
        None => "exit_code=terminated_by_signal".to_string(),
    }
}
