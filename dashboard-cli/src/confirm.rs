//! Interactive yes/no prompt on the terminal.

use std::io;
use std::io::BufRead;
use std::io::Write;

/// Asks `message` on stderr and reads the answer from stdin.
///
/// Anything but `y`/`yes` (including EOF) declines.
pub fn ask(message: &str) -> bool {
    eprint!("{message} [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            log::warn!("Could not read confirmation: {}", e);
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
