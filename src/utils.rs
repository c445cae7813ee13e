use std::process::exit;

use rustyline::{error::ReadlineError, DefaultEditor};

/// Asks a y/N question. Anything but a yes, Ctrl-C and Ctrl-D included, is a no.
pub fn confirm(rl: &mut DefaultEditor, question: &str) -> anyhow::Result<bool> {
    match rl.readline(question) {
        Ok(answer) => Ok(is_yes(&answer)),
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn exit_with_msg(message: &str, code: i32) -> ! {
    eprintln!("{message}");
    exit(code)
}
