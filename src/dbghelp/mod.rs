use crate::{Frames, FrameFilter, StackCapturer, MAX_FRAMES};
use lazy_static::lazy_static;
use std::ffi::c_void;
use std::sync::{Mutex, PoisonError};
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Diagnostics::Debug::{
    RtlCaptureContext, StackWalk64, SymFunctionTableAccess64, SymGetModuleBase64, CONTEXT,
};
use windows::Win32::System::Threading::{GetCurrentProcess, GetCurrentThread};

mod symbols;

use symbols::SymbolSession;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "aarch64")]
use aarch64 as arch;

#[cfg(target_arch = "x86")]
mod x86;
#[cfg(target_arch = "x86")]
use x86 as arch;

#[cfg(target_arch = "x86_64")]
mod x64;
#[cfg(target_arch = "x86_64")]
use x64 as arch;

lazy_static! {
    // DbgHelp is single threaded, every call into it goes through this lock.
    static ref SESSION: Mutex<SymbolSession> = Mutex::new(SymbolSession::initialize());
}

/// `StackCapturer` built on DbgHelp's `StackWalk64`.
///
/// Frames are rendered as `<file>:<line>: <symbol>`, or `<symbol>` when the
/// address has no line information. The walk skips the frames of this crate's
/// capture routines and stops at `main`.
#[derive(Debug, Default, Copy, Clone)]
pub struct DbgHelpCapturer;

impl StackCapturer for DbgHelpCapturer {
    fn frames(&self, ignore_filter: Option<&str>) -> Frames {
        walk(ignore_filter)
    }
}

// `CONTEXT` must be 16-byte aligned on x86_64 and aarch64.
#[repr(C, align(16))]
struct AlignedContext(CONTEXT);

/// Walks the calling thread's stack, starting from this very function.
///
/// `walk` and the entry points leading to it (`callstack`, `capture`,
/// `frames`) are recognized by name and dropped, whether or not they were
/// inlined or called through a `dyn StackCapturer`.
#[inline(never)]
fn walk(ignore_filter: Option<&str>) -> Frames {
    let session = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    if !session.is_initialized() {
        log::trace!("symbol handler unavailable, frames stay unresolved");
    }
    let (process, thread) = unsafe { (GetCurrentProcess(), GetCurrentThread()) };

    let mut context = AlignedContext(CONTEXT::default());
    unsafe { RtlCaptureContext(&mut context.0) };
    let mut frame = arch::initial_frame(&context.0);

    let mut filter = FrameFilter::new(ignore_filter);
    let mut frames = Frames::new();
    for _ in 0..MAX_FRAMES {
        let stepped = unsafe {
            StackWalk64(
                arch::MACHINE.0 as u32,
                process,
                thread,
                &mut frame,
                arch::context_record(&mut context.0),
                None,
                Some(function_table_access),
                Some(module_base),
                None,
            )
        };
        if !stepped.as_bool() {
            break;
        }

        let pc = frame.AddrPC.Offset;
        let symbol = session.resolve(process, pc);
        let name = match &symbol {
            Ok(symbol) => {
                log::trace!("{:#x}: {}", pc, symbol);
                symbol.to_string()
            }
            Err(err) => {
                log::trace!("{:#x}: {}", pc, err);
                String::new()
            }
        };
        if matches!(&symbol, Ok(symbol) if symbol.is_capture_routine()) {
            continue;
        }

        if filter.admit(&name) {
            frames.push(name);
        }
        if matches!(&symbol, Ok(symbol) if symbol.is_entry_point()) {
            break;
        }
        if frame.AddrReturn.Offset == 0 {
            break;
        }
    }
    frames
}

unsafe extern "system" fn function_table_access(process: HANDLE, addr_base: u64) -> *mut c_void {
    SymFunctionTableAccess64(process, addr_base)
}

unsafe extern "system" fn module_base(process: HANDLE, address: u64) -> u64 {
    SymGetModuleBase64(process, address)
}
