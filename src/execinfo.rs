use crate::{Error, Frames, StackCapturer, MAX_FRAMES};
use libc::{c_char, c_int, c_void};
use smallvec::SmallVec;
use std::ffi::CStr;
use std::io;
use std::{ptr, slice};

/// Raw return addresses, innermost first.
pub type Addresses = SmallVec<[*mut c_void; MAX_FRAMES]>;

/// `StackCapturer` built on `backtrace(3)` and `backtrace_symbols(3)`.
///
/// Lines are whatever the C library renders, typically
/// `<module>(<symbol>+<offset>) [<address>]` on glibc. No source lines are
/// resolved, and frames are never dropped: the ignore filter is only honoured
/// when the `posix-ignore-filter` feature is enabled.
#[derive(Debug, Default, Copy, Clone)]
pub struct ExecinfoCapturer;

impl StackCapturer for ExecinfoCapturer {
    // Keeps the bounded address buffer out of the callers' frames.
    #[inline(never)]
    fn frames(&self, ignore_filter: Option<&str>) -> Frames {
        let addresses = capture_addresses();
        let frames = symbolicate(&addresses).unwrap_or_else(|err| {
            log::warn!("failed to symbolicate {} frames: {}", addresses.len(), err);
            addresses.iter().map(|address| format!("{:#x}", *address as usize)).collect()
        });
        apply_filter(frames, ignore_filter)
    }
}

#[cfg(feature = "posix-ignore-filter")]
fn apply_filter(frames: Frames, ignore_filter: Option<&str>) -> Frames {
    let mut filter = crate::FrameFilter::new(ignore_filter);
    frames.into_iter().filter(|frame| filter.admit(frame)).collect()
}

#[cfg(not(feature = "posix-ignore-filter"))]
#[inline]
fn apply_filter(frames: Frames, _ignore_filter: Option<&str>) -> Frames {
    frames
}

/// Captures up to [MAX_FRAMES] return addresses of the calling thread.
#[inline(never)]
pub fn capture_addresses() -> Addresses {
    let mut buffer = [ptr::null_mut::<c_void>(); MAX_FRAMES];
    let count = unsafe { backtrace(buffer.as_mut_ptr(), MAX_FRAMES as c_int) };
    let count = (count.max(0) as usize).min(MAX_FRAMES);
    buffer[..count].iter().copied().collect()
}

/// Renders every address with `backtrace_symbols`, one string per address.
pub fn symbolicate(addresses: &[*mut c_void]) -> crate::Result<Frames> {
    if addresses.is_empty() {
        return Ok(Frames::new());
    }
    let strings = unsafe { backtrace_symbols(addresses.as_ptr(), addresses.len() as c_int) };
    if strings.is_null() {
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        return Err(Error::Symbolicate(errno));
    }
    // A single allocation holds both the pointer array and the strings.
    let strings = SymbolStrings(strings);
    let mut frames = Frames::with_capacity(addresses.len());
    for &s in strings.as_slice(addresses.len()) {
        if s.is_null() {
            frames.push(String::new());
        } else {
            frames.push(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned());
        }
    }
    Ok(frames)
}

struct SymbolStrings(*mut *mut c_char);

impl SymbolStrings {
    #[inline]
    fn as_slice(&self, len: usize) -> &[*mut c_char] {
        unsafe { slice::from_raw_parts(self.0, len) }
    }
}

impl Drop for SymbolStrings {
    fn drop(&mut self) {
        unsafe { libc::free(self.0 as *mut c_void) }
    }
}

extern "C" {
    // glibc and libSystem both provide these in `<execinfo.h>`.
    fn backtrace(buffer: *mut *mut c_void, size: c_int) -> c_int;
    fn backtrace_symbols(buffer: *const *mut c_void, size: c_int) -> *mut *mut c_char;
}
