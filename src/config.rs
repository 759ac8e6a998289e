//! Environment configuration.

use std::env;
use std::path::PathBuf;

use delivery::DEFAULT_SEND_TIMEOUT_SECS;

use crate::contacts::FileOrder;

pub const LISTS_DIR_ENV: &str = "FIMG_LISTS_DIR";
pub const APPLESCRIPT_ENV: &str = "FIMG_APPLESCRIPT";
pub const OSASCRIPT_ENV: &str = "FIMG_OSASCRIPT";
pub const SEND_TIMEOUT_ENV: &str = "FIMG_SEND_TIMEOUT_SECS";
pub const FILE_ORDER_ENV: &str = "FIMG_FILE_ORDER";
pub const DEBUG_ENV: &str = "FIMG_DEBUG";
pub const LOG_FILE_ENV: &str = "FIMG_LOG_FILE";

const DEFAULT_LISTS_DIR: [&str; 2] = ["fimg", "lists"];
const DEFAULT_APPLESCRIPT: [&str; 3] = ["fimg", "engine", "send_imessage.applescript"];
const DEFAULT_OSASCRIPT: &str = "osascript";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub lists_dir: PathBuf,
    pub applescript_path: PathBuf,
    /// Interpreter that runs the AppleScript.
    pub osascript: String,
    pub send_timeout_secs: u64,
    pub file_order: FileOrder,
    pub debug: bool,
    pub log_file: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let home = home_dir();
        Self {
            lists_dir: env_string_opt(LISTS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(DEFAULT_LISTS_DIR[0]).join(DEFAULT_LISTS_DIR[1])),
            applescript_path: env_string_opt(APPLESCRIPT_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| DEFAULT_APPLESCRIPT.iter().fold(home, |path, part| path.join(part))),
            osascript: env_string_opt(OSASCRIPT_ENV).unwrap_or_else(|| DEFAULT_OSASCRIPT.to_string()),
            send_timeout_secs: env_string_opt(SEND_TIMEOUT_ENV)
                .and_then(|value| value.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS),
            file_order: env_string_opt(FILE_ORDER_ENV)
                .map(|value| FileOrder::from_config(&value))
                .unwrap_or_default(),
            debug: env_flag(DEBUG_ENV),
            log_file: env_string_opt(LOG_FILE_ENV),
        }
    }
}

fn home_dir() -> PathBuf {
    env_string_opt("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
