use std::ffi::c_void;
use std::ptr;
use windows::Win32::System::Diagnostics::Debug::{AddrModeFlat, ADDRESS64, CONTEXT, STACKFRAME64};
use windows::Win32::System::SystemInformation::{IMAGE_FILE_MACHINE, IMAGE_FILE_MACHINE_I386};

pub const MACHINE: IMAGE_FILE_MACHINE = IMAGE_FILE_MACHINE_I386;

/// Seed `StackWalk64` with eip, esp and ebp.
pub fn initial_frame(context: &CONTEXT) -> STACKFRAME64 {
    STACKFRAME64 {
        AddrPC: flat(context.Eip),
        AddrStack: flat(context.Esp),
        AddrFrame: flat(context.Ebp),
        ..Default::default()
    }
}

/// The x86 walker follows the ebp chain seeded in `STACKFRAME64`, no
/// context record is handed over.
#[inline]
pub fn context_record(_context: &mut CONTEXT) -> *mut c_void {
    ptr::null_mut()
}

#[inline]
fn flat(offset: u32) -> ADDRESS64 {
    ADDRESS64 {
        Offset: offset as u64,
        Mode: AddrModeFlat,
        ..Default::default()
    }
}
