use std::ffi::c_void;
use windows::Win32::System::Diagnostics::Debug::{AddrModeFlat, ADDRESS64, CONTEXT, STACKFRAME64};
use windows::Win32::System::SystemInformation::{IMAGE_FILE_MACHINE, IMAGE_FILE_MACHINE_AMD64};

pub const MACHINE: IMAGE_FILE_MACHINE = IMAGE_FILE_MACHINE_AMD64;

/// Seed `StackWalk64` with rip, rsp and rbp.
pub fn initial_frame(context: &CONTEXT) -> STACKFRAME64 {
    STACKFRAME64 {
        AddrPC: flat(context.Rip),
        AddrStack: flat(context.Rsp),
        AddrFrame: flat(context.Rbp),
        ..Default::default()
    }
}

/// On x86_64 `StackWalk64` needs the full context to unwind.
#[inline]
pub fn context_record(context: &mut CONTEXT) -> *mut c_void {
    context as *mut CONTEXT as *mut c_void
}

#[inline]
fn flat(offset: u64) -> ADDRESS64 {
    ADDRESS64 {
        Offset: offset,
        Mode: AddrModeFlat,
        ..Default::default()
    }
}
