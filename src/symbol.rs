use std::fmt;

/// Path prefix of every symbol defined by this crate.
const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Functions of this crate that sit on the stack while a capture runs.
const CAPTURE_ROUTINES: &[&str] = &["callstack", "capture", "frames", "walk"];

/// Source position of a resolved address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

/// A program counter resolved to the nearest preceding symbol.
///
/// `address` is the start of the symbol, not the program counter that was
/// looked up, so every frame inside the same function shares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
    pub location: Option<Location>,
}

impl Symbol {
    #[inline]
    pub fn new(name: impl Into<String>, address: u64) -> Self {
        Self {
            name: name.into(),
            address,
            location: None,
        }
    }

    #[inline]
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
        });
        self
    }

    /// Whether this symbol is the program entry point (`main`).
    #[inline]
    pub fn is_entry_point(&self) -> bool {
        ends_with_ident(&self.name, "main")
    }

    /// Whether this symbol is one of the functions performing the capture,
    /// which never belong in the captured stack.
    pub fn is_capture_routine(&self) -> bool {
        self.name.starts_with(CRATE_PREFIX) && CAPTURE_ROUTINES.contains(&last_segment(&self.name))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}:{}: {}", location.file, location.line, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Determine whether the last path segment of `name` is exactly `ident`.
///
/// The segment must be preceded by `::`, a space or `!` (the `module!symbol`
/// form), so `foo::main` and `main` match while `invoke_main` does not.
pub fn ends_with_ident(name: &str, ident: &str) -> bool {
    match name.strip_suffix(ident) {
        Some("") => true,
        Some(prefix) => prefix.ends_with("::") || prefix.ends_with(' ') || prefix.ends_with('!'),
        None => false,
    }
}

/// The last path segment of a symbol name, without generic arguments or a
/// trailing `::h<hash>` segment.
///
/// `crate::Trait::method<crate::Type>` yields `method`.
pub fn last_segment(name: &str) -> &str {
    let mut name = name;
    if let Some(i) = name.rfind("::h") {
        let hash = &name[i + 3..];
        if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            name = &name[..i];
        }
    }
    if name.ends_with('>') {
        let mut depth = 0usize;
        for (i, c) in name.char_indices().rev() {
            match c {
                '>' => depth += 1,
                '<' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        name = &name[..i];
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    match name.rfind("::") {
        Some(i) => &name[i + 2..],
        None => name,
    }
}
