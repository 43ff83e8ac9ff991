//! Interactive confirmation.

use crate::error::{CleanError, Result};
use std::io::{BufRead, Write};

/// Ask a yes/no question. Only `y` or `yes` (any case) confirms; an empty
/// answer or end of input declines.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{} [y/N] ", question)
        .and_then(|_| output.flush())
        .map_err(|e| CleanError::UserError(format!("failed to write prompt: {}", e)))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| CleanError::UserError(format!("failed to read answer: {}", e)))?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
