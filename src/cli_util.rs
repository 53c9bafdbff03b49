use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;

use crate::theme::catppuccin::Mocha;
use crate::{RunError, TranslateError};

fn paint(style: Style, text: &str) -> String {
    if io::stderr().is_terminal() {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Report a translation error with the offending source line and a caret.
/// `program` is the binary name used as message prefix.
pub fn print_translate_error(program: &str, path: &str, code: &[u8], err: &TranslateError) {
    let kind = paint(Mocha::RED.bold(), "Parse error");
    let msg = format!("{program}: {path}: {kind}: {err}");
    print_error_with_context(&msg, code, err.pos());
}

/// Report a runtime error. Tape overruns get a hint about `--wrap`.
pub fn print_run_error(program: &str, path: &str, err: &RunError) {
    let kind = match err {
        RunError::Io { .. } => "I/O error",
        RunError::PointerOutOfBounds { .. } => "Runtime error",
        RunError::StepLimitExceeded { .. } => "Aborted",
    };
    eprintln!("{program}: {path}: {}: {err}", paint(Mocha::RED.bold(), kind));
    if let RunError::PointerOutOfBounds { .. } = err {
        eprintln!("  {}", paint(Mocha::SURFACE2.normal(), "hint: use --wrap for a circular tape"));
    }
    let _ = io::stderr().flush();
}

/// Where a byte offset falls in the source: 1-based line, 0-based column in
/// characters, and the text of that line.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line_no: usize,
    pub col: usize,
    pub line: String,
}

/// Locate byte offset `pos` in raw `code`. Lines are split on `\n` bytes;
/// the line itself is decoded lossily, one replacement character per invalid
/// sequence, so the column counts what is actually displayed.
pub fn locate(code: &[u8], pos: usize) -> SourceLocation {
    let pos = pos.min(code.len());
    let line_start = code[..pos].iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let line_end = code[pos..].iter().position(|&b| b == b'\n').map_or(code.len(), |i| pos + i);
    let line_no = code[..line_start].iter().filter(|&&b| b == b'\n').count() + 1;
    let col = String::from_utf8_lossy(&code[line_start..pos]).chars().count();
    let line = String::from_utf8_lossy(&code[line_start..line_end]).into_owned();
    SourceLocation { line_no, col, line }
}

/// Print a message followed by the source line containing byte offset `pos`
/// and a caret under it. Long lines are cut to a window around the caret.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    let SourceLocation { line_no, col, line } = locate(code, pos);

    eprintln!("{prefix} (line {line_no}, column {})", col + 1);

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let start_char = col.saturating_sub(WINDOW_CHARS);
    let end_char = (col + WINDOW_CHARS + 1).min(line.chars().count());
    let slice: String = line
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c == '\t' || c == '\r' { ' ' } else { c })
        .collect();

    eprintln!("  {slice}");

    // Caret under the exact position
    let underline = format!("{}^", " ".repeat(col - start_char));
    eprintln!("  {}", paint(Mocha::YELLOW.bold(), &underline));
    let _ = io::stderr().flush();
}

/// Wall-clock time the way the batch report prints it: milliseconds, or
/// seconds past nine seconds.
pub fn format_duration(elapsed: std::time::Duration) -> String {
    let nanos = elapsed.as_nanos() as f64;
    if nanos > 9000.0e6 {
        format!("{:.2}s", nanos / 1e9)
    } else {
        format!("{:.2}ms", nanos / 1e6)
    }
}

/// Print a section heading such as the file name in a batch.
pub fn print_heading(text: &str) {
    eprintln!("{}", paint(Mocha::PEACH.bold(), text));
}
