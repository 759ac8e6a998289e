//! Process-backed terminal: termios raw mode on the controlling TTY.
//!
//! While raw mode is held, SIGINT/SIGTERM and panics restore the saved termios
//! before the process goes away, so the shell never inherits a raw terminal.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use libc::{self, c_int};
use signal_hook::iterator::Signals;

use crate::core::terminal::Terminal;

const FALLBACK_COLUMNS: u16 = 80;

fn write_all_fd_with<FWrite>(fd: c_int, bytes: &[u8], mut write_once: FWrite) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => {
                let remaining = bytes.len() - written;
                if count > remaining {
                    return Err(io::Error::other("write returned more bytes than requested"));
                }
                written += count;
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    write_all_fd_with(fd, data.as_bytes(), |fd, buf| {
        let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        if result < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(result as usize)
        }
    })
}

fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Prefer the controlling TTY so confirmation works with redirected stdin.
fn open_controlling_tty() -> Option<c_int> {
    let flags = libc::O_RDWR | libc::O_NOCTTY | libc::O_CLOEXEC;
    let fd = unsafe { libc::open(c"/dev/tty".as_ptr(), flags) };
    (fd >= 0).then_some(fd)
}

pub struct ProcessTerminal {
    input_fd: c_int,
    output_fd: c_int,
    owns_input_fd: bool,
    original_termios: Option<libc::termios>,
    signal_guard: Option<SignalHookGuard>,
    panic_guard: Option<PanicHookGuard>,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        match open_controlling_tty() {
            Some(fd) => {
                let mut terminal = Self::with_fds(fd, libc::STDOUT_FILENO);
                terminal.owns_input_fd = true;
                terminal
            }
            None => Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO),
        }
    }

    /// Borrow existing descriptors; they are not closed on drop.
    pub fn with_fds(input_fd: c_int, output_fd: c_int) -> Self {
        Self {
            input_fd,
            output_fd,
            owns_input_fd: false,
            original_termios: None,
            signal_guard: None,
            panic_guard: None,
        }
    }

    pub fn is_raw(&self) -> bool {
        self.original_termios.is_some()
    }

    fn install_cleanup_hooks(&mut self, original: libc::termios) {
        let fd = self.input_fd;
        self.panic_guard = Some(install_panic_hook(move || {
            let _ = set_termios(fd, &original);
        }));
        match install_signal_handlers(move |_signal| {
            let _ = set_termios(fd, &original);
        }) {
            Ok(guard) => self.signal_guard = Some(guard),
            Err(err) => tracing::warn!(error = %err, "cannot register terminal signal cleanup"),
        }
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        let _ = self.restore_mode();
        if self.owns_input_fd {
            unsafe {
                libc::close(self.input_fd);
            }
        }
    }
}

impl Terminal for ProcessTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let first_entry = self.original_termios.is_none();
        let original = match self.original_termios {
            Some(original) => original,
            None => get_termios(self.input_fd)?,
        };
        // Hooks go in first so a signal can never land on a raw terminal without cleanup.
        if first_entry {
            self.install_cleanup_hooks(original);
        }

        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        if let Err(err) = set_termios(self.input_fd, &raw) {
            if first_entry {
                self.signal_guard = None;
                self.panic_guard = None;
            }
            return Err(err);
        }

        if first_entry {
            self.original_termios = Some(original);
        }
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        let Some(original) = self.original_termios.take() else {
            return Ok(());
        };
        // Flush input before leaving raw mode to avoid buffered bytes leaking to the shell.
        let _ = unsafe { libc::tcflush(self.input_fd, libc::TCIFLUSH) };
        let result = set_termios(self.input_fd, &original);
        self.signal_guard = None;
        self.panic_guard = None;
        result
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        loop {
            let result =
                unsafe { libc::read(self.input_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
            if result == 1 {
                return Ok(Some(byte));
            }
            if result == 0 {
                return Ok(None);
            }
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        write_fd(self.output_fd, data)
    }

    fn columns(&self) -> u16 {
        read_winsize(self.output_fd)
            .or_else(|| read_winsize(self.input_fd))
            .map(|(cols, _)| cols)
            .unwrap_or(FALLBACK_COLUMNS)
    }
}

type SignalCleanupFn = dyn Fn(c_int) + Send + Sync + 'static;

/// Cleanup run by the signal watcher before the process exits.
static SIGNAL_CLEANUP: Mutex<Option<Arc<SignalCleanupFn>>> = Mutex::new(None);
static SIGNAL_WATCHER: Mutex<bool> = Mutex::new(false);

/// Exit status for a process ended by `signal`, as a shell reports it.
fn signal_exit_code(signal: c_int) -> i32 {
    128 + signal
}

/// Disarms its cleanup on drop. The watcher stays installed and keeps exiting on signals.
pub struct SignalHookGuard {
    cleanup: Arc<SignalCleanupFn>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        let mut slot = SIGNAL_CLEANUP.lock().unwrap_or_else(PoisonError::into_inner);
        if slot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.cleanup))
        {
            *slot = None;
        }
    }
}

/// Install a SIGINT/SIGTERM cleanup hook that receives the signal number.
///
/// signal-hook never gives the default disposition back, so one process-wide
/// watcher thread owns both signals. It runs the armed cleanup, if any, and
/// then exits with `128 + signal`.
pub fn install_signal_handlers<F>(cleanup: F) -> io::Result<SignalHookGuard>
where
    F: Fn(c_int) + Send + Sync + 'static,
{
    start_signal_watcher()?;
    let cleanup: Arc<SignalCleanupFn> = Arc::new(cleanup);
    *SIGNAL_CLEANUP.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&cleanup));
    Ok(SignalHookGuard { cleanup })
}

fn start_signal_watcher() -> io::Result<()> {
    let mut started = SIGNAL_WATCHER.lock().unwrap_or_else(PoisonError::into_inner);
    if *started {
        return Ok(());
    }

    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    thread::Builder::new()
        .name("fimg-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let cleanup = SIGNAL_CLEANUP
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(cleanup) = cleanup {
                    cleanup(signal);
                }
                std::process::exit(signal_exit_code(signal));
            }
        })?;
    *started = true;
    Ok(())
}

#[cfg(test)]
fn signal_cleanup_armed() -> bool {
    SIGNAL_CLEANUP
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

type PanicHookFn = dyn Fn(&std::panic::PanicHookInfo) + Send + Sync + 'static;

/// Restores the previous panic hook on drop.
pub struct PanicHookGuard {
    previous: Option<Arc<Box<PanicHookFn>>>,
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        // Dropping our wrapper releases its clone of `previous`.
        drop(std::panic::take_hook());
        match Arc::try_unwrap(previous) {
            Ok(previous) => std::panic::set_hook(previous),
            Err(previous) => std::panic::set_hook(Box::new(move |info| (previous)(info))),
        }
    }
}

/// Install a panic hook that runs cleanup once, then delegates to the previous hook.
pub fn install_panic_hook<F>(cleanup: F) -> PanicHookGuard
where
    F: Fn() + Send + Sync + 'static,
{
    let ran = AtomicBool::new(false);
    let previous = Arc::new(std::panic::take_hook());
    let previous_for_hook = Arc::clone(&previous);
    std::panic::set_hook(Box::new(move |info| {
        if !ran.swap(true, Ordering::SeqCst) {
            cleanup();
        }
        (previous_for_hook)(info);
    }));

    PanicHookGuard {
        previous: Some(previous),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        get_termios, signal_cleanup_armed, signal_exit_code, write_all_fd_with, ProcessTerminal,
    };
    use crate::core::terminal::{RawModeGuard, Terminal};
    use libc::c_int;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    fn write_master(pty: &Pty, bytes: &[u8]) {
        let written =
            unsafe { libc::write(pty.master, bytes.as_ptr() as *const libc::c_void, bytes.len()) };
        assert_eq!(written, bytes.len() as isize, "write to pty master failed");
    }

    // Raw-mode tests install process-wide panic hooks.
    fn hook_test_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn raw_mode_is_restored_when_guard_drops() {
        let _lock = hook_test_lock();
        let pty = open_pty();
        let before = get_termios(pty.slave).expect("tcgetattr");
        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);

        {
            let guard = RawModeGuard::acquire(&mut terminal).expect("raw mode");
            assert!(guard.is_raw());
            let raw = get_termios(pty.slave).expect("tcgetattr");
            assert_eq!(raw.c_lflag & libc::ECHO, 0);
            assert_eq!(raw.c_lflag & libc::ICANON, 0);
        }

        assert!(!terminal.is_raw());
        let after = get_termios(pty.slave).expect("tcgetattr");
        assert_eq!(after.c_lflag, before.c_lflag);
        assert_eq!(after.c_iflag, before.c_iflag);
    }

    #[test]
    fn signal_cleanup_is_armed_only_while_raw_mode_is_held() {
        let _lock = hook_test_lock();
        let pty = open_pty();
        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);

        {
            let _guard = RawModeGuard::acquire(&mut terminal).expect("raw mode");
            assert!(signal_cleanup_armed());
        }
        assert!(!signal_cleanup_armed());

        {
            let _guard = RawModeGuard::acquire(&mut terminal).expect("raw mode again");
            assert!(signal_cleanup_armed());
        }
        assert!(!signal_cleanup_armed());
    }

    #[test]
    fn signal_exit_codes_follow_shell_convention() {
        assert_eq!(signal_exit_code(libc::SIGINT), 130);
        assert_eq!(signal_exit_code(libc::SIGTERM), 143);
    }

    #[test]
    fn reads_single_byte_in_raw_mode() {
        let _lock = hook_test_lock();
        let pty = open_pty();
        let mut terminal = ProcessTerminal::with_fds(pty.slave, pty.slave);
        let mut guard = RawModeGuard::acquire(&mut terminal).expect("raw mode");

        write_master(&pty, b"\rx");
        assert_eq!(guard.read_byte().expect("read"), Some(b'\r'));
    }

    #[test]
    fn enable_raw_mode_fails_on_non_tty() {
        let mut fds = [0 as c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let mut terminal = ProcessTerminal::with_fds(fds[0], fds[1]);

        assert!(terminal.enable_raw_mode().is_err());
        assert!(!terminal.is_raw());
        drop(terminal);
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }

    #[test]
    fn closed_input_reads_as_none() {
        let mut fds = [0 as c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        unsafe {
            libc::close(fds[1]);
        }
        let mut terminal = ProcessTerminal::with_fds(fds[0], fds[0]);
        assert_eq!(terminal.read_byte().expect("read"), None);
        drop(terminal);
        unsafe {
            libc::close(fds[0]);
        }
    }

    #[test]
    fn columns_fall_back_to_eighty_without_a_tty() {
        let terminal = ProcessTerminal::with_fds(-1, -1);
        assert_eq!(terminal.columns(), 80);
    }

    #[test]
    fn write_all_fd_with_retries_on_eintr_and_writes_all_bytes() {
        let data = b"hello";
        let mut out = Vec::new();
        let mut calls = 0;
        write_all_fd_with(1, data, |_, buf| {
            calls += 1;
            match calls {
                1 => Err(io::Error::from(io::ErrorKind::Interrupted)),
                2 => {
                    out.extend_from_slice(&buf[..2]);
                    Ok(2)
                }
                _ => {
                    out.extend_from_slice(buf);
                    Ok(buf.len())
                }
            }
        })
        .expect("write_all_fd_with failed");

        assert_eq!(out, data);
    }

    #[test]
    fn write_all_fd_with_rejects_zero_length_writes() {
        let err = write_all_fd_with(1, b"abc", |_, _| Ok(0)).expect_err("zero write");
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }
}
