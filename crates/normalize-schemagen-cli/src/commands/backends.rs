//! Backends command - list registered output backends.

use normalize_schemagen::backends;

pub fn run() -> i32 {
    for backend in backends() {
        println!("{:<8} .{}", backend.name(), backend.extension());
    }
    0
}
