use callstack::{callstack, PlatformCapturer, StackCapturer, MAX_FRAMES};

const SUPPORTED: bool = cfg!(any(
    all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")),
    target_os = "macos",
    all(target_os = "linux", target_env = "gnu"),
));

#[test]
fn test_lines_start_with_indent() {
    let stack = func1("  ", None);
    assert_eq!(stack.is_empty(), !SUPPORTED);
    for line in stack.split_terminator('\n') {
        assert!(line.starts_with("  "));
        assert!(!line[2..].is_empty());
    }
    assert!(stack.is_empty() || stack.ends_with('\n'));
}

#[test]
fn test_bounded_by_max_frames() {
    let stack = recurse(MAX_FRAMES + 64);
    let lines = stack.lines().count();
    assert!(lines <= MAX_FRAMES);
    #[cfg(any(target_os = "macos", all(target_os = "linux", target_env = "gnu")))]
    assert_eq!(lines, MAX_FRAMES);
}

#[test]
fn test_capture_twice() {
    let first = func1("", None);
    let second = func1("", None);
    assert_eq!(first.lines().count(), second.lines().count());
    assert_eq!(first.is_empty(), !SUPPORTED);
}

#[test]
fn test_capturer_matches_callstack() {
    let capturer = PlatformCapturer::default();
    let frames = capturer.frames(None);
    assert!(frames.len() <= MAX_FRAMES);
    assert_eq!(frames.is_empty(), !SUPPORTED);
}

#[test]
#[cfg(windows)]
fn test_resolves_caller_frames() {
    let stack = func1("", None);
    let lines: Vec<&str> = stack.lines().collect();
    assert!(lines[0].ends_with("func3"));
    assert!(lines[1].ends_with("func2"));
    assert!(lines[2].ends_with("func1"));
    assert!(lines[3].ends_with("test_resolves_caller_frames"));
}

#[test]
#[cfg(windows)]
fn test_ignore_filter_drops_leading_frames() {
    let stack = func1("", Some("::func"));
    let first = stack.lines().next().unwrap();
    assert!(first.ends_with("test_ignore_filter_drops_leading_frames"));
    assert!(stack.lines().count() > 1);
}

#[test]
#[cfg(any(target_os = "macos", all(target_os = "linux", target_env = "gnu")))]
#[cfg(not(feature = "posix-ignore-filter"))]
fn test_ignore_filter_ignored_on_posix() {
    let plain = func1("", None);
    let filtered = func1("", Some("capture"));
    assert_eq!(plain.lines().count(), filtered.lines().count());
}

#[inline(never)]
fn func1(indent: &str, ignore_filter: Option<&str>) -> String {
    let stack = func2(indent, ignore_filter);
    std::hint::black_box(stack)
}

#[inline(never)]
fn func2(indent: &str, ignore_filter: Option<&str>) -> String {
    let stack = func3(indent, ignore_filter);
    std::hint::black_box(stack)
}

#[inline(never)]
fn func3(indent: &str, ignore_filter: Option<&str>) -> String {
    let stack = callstack(indent, ignore_filter);
    std::hint::black_box(stack)
}

#[inline(never)]
fn recurse(depth: usize) -> String {
    let stack = if depth == 0 { callstack("", None) } else { recurse(depth - 1) };
    std::hint::black_box(stack)
}
