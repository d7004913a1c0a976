use crate::{Error, Symbol};
use std::ffi::CStr;
use std::{mem, ptr, slice};
use windows::core::PCSTR;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Diagnostics::Debug::{
    SymFromAddr, SymGetLineFromAddr64, SymInitialize, SymSetOptions, IMAGEHLP_LINE64, MAX_SYM_NAME, SYMBOL_INFO,
    SYMOPT_DEFERRED_LOADS, SYMOPT_LOAD_LINES, SYMOPT_UNDNAME,
};
use windows::Win32::System::Threading::GetCurrentProcess;

#[cfg(test)]
pub static INITIALIZATIONS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// The process-wide DbgHelp symbol handler.
///
/// Created once, the first time a stack is captured, and never cleaned up.
/// When initialization fails the session is still usable, lookups simply
/// keep failing.
#[derive(Debug)]
pub struct SymbolSession {
    initialized: bool,
}

impl SymbolSession {
    pub fn initialize() -> Self {
        #[cfg(test)]
        INITIALIZATIONS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut options = SYMOPT_UNDNAME | SYMOPT_DEFERRED_LOADS;
        if cfg!(feature = "source-lines") {
            options |= SYMOPT_LOAD_LINES;
        }
        let result = unsafe {
            SymSetOptions(options);
            SymInitialize(GetCurrentProcess(), PCSTR::null(), true)
        };
        match result {
            Ok(()) => {
                log::debug!("symbol handler initialized with options {:#x}", options);
                Self { initialized: true }
            }
            Err(err) => {
                let err = Error::SymbolInit(err.code().0);
                log::warn!("{}, frames will not be resolved", err);
                Self { initialized: false }
            }
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolve `pc` to the nearest preceding symbol, with its source line
    /// when DbgHelp has one.
    pub fn resolve(&self, process: HANDLE, pc: u64) -> crate::Result<Symbol> {
        let mut buffer = SymbolBuffer::new();
        let mut displacement = 0u64;
        let info = ptr::addr_of_mut!(buffer) as *mut SYMBOL_INFO;
        unsafe { SymFromAddr(process, pc, Some(ptr::addr_of_mut!(displacement)), info) }
            .map_err(|_| Error::SymbolNotFound(pc))?;
        let symbol = Symbol::new(buffer.name(), buffer.info.Address);
        if !cfg!(feature = "source-lines") {
            return Ok(symbol);
        }
        match line(process, pc) {
            Ok((file, line)) => Ok(symbol.with_location(file, line)),
            Err(_) => Ok(symbol),
        }
    }
}

fn line(process: HANDLE, pc: u64) -> crate::Result<(String, u32)> {
    let mut line = IMAGEHLP_LINE64 {
        SizeOfStruct: mem::size_of::<IMAGEHLP_LINE64>() as u32,
        ..Default::default()
    };
    let mut displacement = 0u32;
    unsafe { SymGetLineFromAddr64(process, pc, &mut displacement, &mut line) }
        .map_err(|_| Error::LineNotFound(pc))?;
    if line.FileName.is_null() {
        return Err(Error::LineNotFound(pc));
    }
    let file = unsafe { CStr::from_ptr(line.FileName.0 as *const _) };
    Ok((file.to_string_lossy().into_owned(), line.LineNumber))
}

/// `SYMBOL_INFO` followed by room for the longest name DbgHelp writes.
#[repr(C)]
struct SymbolBuffer {
    info: SYMBOL_INFO,
    _name: [u8; MAX_SYM_NAME as usize],
}

impl SymbolBuffer {
    fn new() -> Self {
        let mut buffer = Self {
            info: SYMBOL_INFO::default(),
            _name: [0; MAX_SYM_NAME as usize],
        };
        buffer.info.SizeOfStruct = mem::size_of::<SYMBOL_INFO>() as u32;
        buffer.info.MaxNameLen = MAX_SYM_NAME;
        buffer
    }

    fn name(&self) -> String {
        // `Name` is a one element array that continues into `_name`.
        let len = self.info.NameLen.min(MAX_SYM_NAME - 1) as usize;
        let bytes = unsafe {
            let start = (self as *const Self as *const u8).add(mem::offset_of!(SYMBOL_INFO, Name));
            slice::from_raw_parts(start, len)
        };
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::PoisonError;

    #[test]
    fn test_resolve() {
        let session = super::super::SESSION.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(session.is_initialized());
        let mut context = super::super::AlignedContext(Default::default());
        unsafe { windows::Win32::System::Diagnostics::Debug::RtlCaptureContext(&mut context.0) };
        let pc = super::super::arch::initial_frame(&context.0).AddrPC.Offset;
        let process = unsafe { GetCurrentProcess() };
        let symbol = session.resolve(process, pc).unwrap();
        assert!(symbol.name.ends_with("test_resolve"));
        assert!(symbol.address != 0 && symbol.address <= pc);
        #[cfg(feature = "source-lines")]
        assert!(symbol.location.unwrap().file.ends_with("symbols.rs"));
    }

    #[test]
    fn test_resolve_unknown_address() {
        let session = super::super::SESSION.lock().unwrap_or_else(PoisonError::into_inner);
        let process = unsafe { GetCurrentProcess() };
        assert_eq!(session.resolve(process, 0x10), Err(Error::SymbolNotFound(0x10)));
    }

    #[test]
    fn test_symbol_buffer_layout() {
        let buffer = SymbolBuffer::new();
        assert_eq!(buffer.info.SizeOfStruct as usize, mem::size_of::<SYMBOL_INFO>());
        assert_eq!(buffer.info.MaxNameLen, MAX_SYM_NAME);
        assert!(buffer.name().is_empty());
    }
}
