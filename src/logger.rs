//! Logging utilities with colored output and progress display.
//!
//! - `log!` for terminal output with a colored `[module]` prefix
//! - `debug!` for per-file detail, shown only with `--verbose`
//! - `ProgressLine` for a single in-place line of counters during bulk passes
//!
//! ```ignore
//! log!("rewrite"; "scanning {} files", count);
//!
//! let progress = ProgressLine::new("rewrite", &[("files", 412)]);
//! progress.inc("files");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress line count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        // Overwrite the progress line; the next inc() redraws it below
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.yellow().bold().to_string(),
        "check" => prefix.bright_blue().bold().to_string(),
        "summary" => prefix.bright_green().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[rewrite] files(42/412)`
///
/// Counters update in place. Uses `try_lock` so worker threads never wait
/// on the terminal; a busy display just skips that refresh. When stdout is
/// not a terminal nothing is drawn until `finish`.
pub struct ProgressLine {
    module: &'static str,
    counters: Vec<Counter>,
    lock: Mutex<()>,
    interactive: bool,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Only includes counters with total > 0.
    pub fn new(module: &'static str, items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        let interactive = stdout().is_terminal();
        if interactive {
            BAR_COUNT.store(1, Ordering::SeqCst);
        }

        let progress = Self {
            module,
            counters,
            lock: Mutex::new(()),
            interactive,
        };
        progress.display();
        progress
    }

    /// Increment the counter with the given name.
    #[inline]
    pub fn inc(&self, name: &str) {
        if let Some(counter) = self.counters.iter().find(|c| c.name == name) {
            counter.current.fetch_add(1, Ordering::Relaxed);
            if self.lock.try_lock().is_some() {
                self.display();
            }
        }
    }

    fn line(&self) -> String {
        self.counters
            .iter()
            .map(|c| {
                format!(
                    "{}({}/{})",
                    c.name,
                    c.current.load(Ordering::Relaxed),
                    c.total
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn display(&self) {
        if !self.interactive || self.counters.is_empty() {
            return;
        }
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{} {}", colorize_prefix(self.module), self.line()).ok();
        stdout.flush().ok();
    }

    /// Finish progress display, keeping the final counts on screen.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            if self.interactive && !self.counters.is_empty() {
                let mut stdout = stdout().lock();
                execute!(
                    stdout,
                    cursor::MoveToColumn(0),
                    Clear(ClearType::CurrentLine)
                )
                .ok();
                writeln!(stdout, "{} {}", colorize_prefix(self.module), self.line()).ok();
                stdout.flush().ok();
            }
        }
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        if self.interactive {
            let mut stdout = stdout().lock();
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            )
            .ok();
            stdout.flush().ok();
        }
    }
}
