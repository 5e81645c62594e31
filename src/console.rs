//! Plain stdout printing. The REPL's textual contract is driven by scripted
//! stdin in integration tests, so output must be exactly what's written here
//! and nothing else — no terminal control codes, no raw mode.

use std::io::{self, Write};

pub fn prompt() {
    print!("db > ");
    let _ = io::stdout().flush();
}

pub fn echo(s: &str) {
    println!("{s}");
}

#[macro_export]
macro_rules! echo {
    ($($arg:tt)*) => {
        $crate::console::echo(&format!($($arg)*))
    };
}
