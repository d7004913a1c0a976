use std::ffi::c_void;
use windows::Win32::System::Diagnostics::Debug::{AddrModeFlat, ADDRESS64, CONTEXT, STACKFRAME64};
use windows::Win32::System::SystemInformation::{IMAGE_FILE_MACHINE, IMAGE_FILE_MACHINE_ARM64};

pub const MACHINE: IMAGE_FILE_MACHINE = IMAGE_FILE_MACHINE_ARM64;

/// Seed `StackWalk64` with pc, sp and fp (x29).
pub fn initial_frame(context: &CONTEXT) -> STACKFRAME64 {
    let fp = unsafe { context.Anonymous.Anonymous.Fp };
    STACKFRAME64 {
        AddrPC: flat(context.Pc),
        AddrStack: flat(context.Sp),
        AddrFrame: flat(fp),
        ..Default::default()
    }
}

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
