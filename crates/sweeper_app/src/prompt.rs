use std::io::{self, BufRead, Write};

pub const LEAVE_PROMPT: &str = "Do you want to leave these channels now? (y/N) ";

/// Asks for confirmation; only `y`/`yes` (any case) agree. EOF declines.
pub fn confirm(mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    output.write_all(LEAVE_PROMPT.as_bytes())?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
