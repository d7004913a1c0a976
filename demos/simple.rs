#[inline(never)]
fn foo() -> String {
    let stack = callstack::callstack("  ", None);
    std::hint::black_box(stack)
}

fn main() {
    print!("{}", foo());
}

/*
Sample output on Windows+x86_64:

  C:\work\callstack\demos\simple.rs:3: simple::foo
  C:\work\callstack\demos\simple.rs:8: simple::main

Sample output on Linux+x86_64 (glibc):

  ./target/debug/examples/simple(+0x8f3e) [0x55d2a1c4bf3e]
  ./target/debug/examples/simple(+0x8e8b) [0x55d2a1c4be8b]
  ./target/debug/examples/simple(+0x8d21) [0x55d2a1c4bd21]
  ./target/debug/examples/simple(+0x8fe2) [0x55d2a1c4bfe2]
  ...
  /lib/x86_64-linux-gnu/libc.so.6(__libc_start_main+0x80) [0x7f0c7a229e40]
  ./target/debug/examples/simple(+0x8c55) [0x55d2a1c4bc55]
*/
