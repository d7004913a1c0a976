// Runs without the test harness so that `main` below is the real entry point
// and the walk can be checked to stop there.

#[inline(never)]
fn foo() -> String {
    let stack = callstack::callstack("  ", None);
    std::hint::black_box(stack)
}

#[cfg(all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
fn main() {
    let stack = foo();
    let lines: Vec<&str> = stack.lines().collect();
    assert!(lines.len() >= 2, "{}", stack);
    assert!(lines.iter().all(|line| line.starts_with("  ")));
    assert!(lines[0].ends_with("::foo"), "{}", stack);
    assert!(lines[lines.len() - 2].ends_with("::foo"), "{}", stack);
    assert!(lines[lines.len() - 1].ends_with("::main"), "{}", stack);
}

#[cfg(not(all(windows, any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64"))))]
fn main() {
    let stack = foo();
    assert!(stack.lines().all(|line| line.starts_with("  ")));
}
