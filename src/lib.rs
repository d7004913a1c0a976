//! This crate captures a human-readable call stack of the current thread, the main
//! purpose of which is to attach "where did this come from" context to log
//! messages and diagnostics.
//!
//! Simple usage:
//! ```
//! fn main() {
//!     let stack = callstack::callstack("    ", None);
//!     for line in stack.lines() {
//!         assert!(line.starts_with("    "));
//!     }
//! }
//! ```
//!
//! The walk is delegated to the operating system:
//! - On Windows, frames are walked with `StackWalk64` and resolved with DbgHelp,
//!   so every line reads `<file>:<line>: <symbol>` (or just `<symbol>` when no line
//!   information is available). The walk stops at `main`.
//! - On Linux (glibc) and macOS, `backtrace(3)` captures the addresses and
//!   `backtrace_symbols(3)` renders them, one line per address.
//! - Everywhere else the result is always empty.
//!
//! Sample output on Windows:
//! ```text
//!   C:\work\simple\src\main.rs:7: simple::foo
//!   C:\work\simple\src\main.rs:12: simple::main
//! ```
//!
//! For more examples, please refer to ../demos/.

#[cfg(all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
mod dbghelp;
#[cfg(any(target_os = "macos", all(target_os = "linux", target_env = "gnu")))]
mod execinfo;
mod filter;
mod noop;
mod symbol;

#[cfg(all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
pub use dbghelp::DbgHelpCapturer;
#[cfg(any(target_os = "macos", all(target_os = "linux", target_env = "gnu")))]
pub use execinfo::ExecinfoCapturer;
pub use filter::FrameFilter;
pub use noop::NoopCapturer;
pub use symbol::{ends_with_ident, last_segment, Location, Symbol};

/// The capturer used by [callstack] on the current target.
#[cfg(all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
pub type PlatformCapturer = DbgHelpCapturer;

/// The capturer used by [callstack] on the current target.
#[cfg(any(target_os = "macos", all(target_os = "linux", target_env = "gnu")))]
pub type PlatformCapturer = ExecinfoCapturer;

/// The capturer used by [callstack] on the current target.
#[cfg(not(any(
    all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")),
    target_os = "macos",
    all(target_os = "linux", target_env = "gnu"),
)))]
pub type PlatformCapturer = NoopCapturer;

/// Upper bound of frames walked (and lines emitted) by a single capture.
pub const MAX_FRAMES: usize = 128;

/// Rendered frames, innermost first, without indentation.
///
/// Heap allocated: a capture may be requested from deep recursion, so the
/// callers' stack frames stay small.
pub type Frames = Vec<String>;

/// A result type that wraps [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Error definition.
///
/// None of these escape [callstack]: a failure degrades the affected frame
/// (or the whole capture) instead.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("symbol service initialization failed: {0:#x}")]
    SymbolInit(i32),

    #[error("no symbol found for address {0:#x}")]
    SymbolNotFound(u64),

    #[error("no source line found for address {0:#x}")]
    LineNotFound(u64),

    #[error("backtrace symbolication failed: errno {0}")]
    Symbolicate(i32),
}

/// A platform facility able to walk and symbolicate the calling thread's stack.
pub trait StackCapturer {
    /// Walks the stack of the calling thread and returns its rendered frames,
    /// innermost first, at most [MAX_FRAMES] of them.
    ///
    /// Whether `ignore_filter` is honoured depends on the platform.
    fn frames(&self, ignore_filter: Option<&str>) -> Frames;

    /// Captures the stack as text, one `<indent><frame>\n` line per frame.
    fn capture(&self, indent: &str, ignore_filter: Option<&str>) -> String {
        render(indent, &self.frames(ignore_filter))
    }
}

/// Captures the calling thread's stack as indented text.
///
/// Every line is `indent` followed by one resolved frame and a newline. When
/// `ignore_filter` is given, the leading frames whose names contain it are
/// dropped (Windows only, unless the `posix-ignore-filter` feature is enabled).
/// Returns an empty string on platforms without a stack walker.
pub fn callstack(indent: &str, ignore_filter: Option<&str>) -> String {
    PlatformCapturer::default().capture(indent, ignore_filter)
}

/// Joins `frames` into text, prefixing each with `indent`.
pub fn render(indent: &str, frames: &[String]) -> String {
    let len = frames.iter().map(|f| indent.len() + f.len() + 1).sum();
    let mut text = String::with_capacity(len);
    for frame in frames {
        text.push_str(indent);
        text.push_str(frame);
        text.push('\n');
    }
    text
}
