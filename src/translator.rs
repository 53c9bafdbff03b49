//! Source text to bytecode.
//!
//! Runs of `+`/`-` and `>`/`<` (whitespace allowed in between) fold into a
//! single instruction carrying the net delta. Loops become a BEQZ/BNEZ pair
//! whose immediates point at each other, so the interpreter lands one past
//! the partner after the usual increment of the program counter.

use std::fmt;

use tracing::debug;

use crate::bytecode::{ADD, BEQZ, BNEZ, Func, Instruction, MOV, Program};

/// Errors that can occur while translating source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// A `[` or `]` without a partner.
    #[error("Unmatched bracket {kind} at byte {pos}")]
    UnmatchedBracket { pos: usize, kind: UnmatchedBracketKind },

    /// More loops open at once than the configured limit allows.
    #[error("Loop nesting deeper than {limit} at byte {pos}")]
    NestingTooDeep { pos: usize, limit: usize },

    /// A folded delta or branch distance does not fit in an instruction.
    #[error("Immediate {value} out of range at byte {pos}")]
    ImmediateOutOfRange { pos: usize, value: i64 },
}

impl TranslateError {
    /// Byte offset into the source where the error was detected.
    pub fn pos(&self) -> usize {
        match self {
            TranslateError::UnmatchedBracket { pos, .. }
            | TranslateError::NestingTooDeep { pos, .. }
            | TranslateError::ImmediateOutOfRange { pos, .. } => *pos,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Translator settings.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    max_nesting: Option<usize>,
    debug_trap: bool,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject programs with more than `limit` loops open at once.
    /// `None` lets the loop stack grow as needed.
    pub fn max_nesting(mut self, limit: Option<usize>) -> Self {
        self.max_nesting = limit;
        self
    }

    /// Translate `?` into a debug-trap call instead of treating it as a comment.
    pub fn debug_trap(mut self, enabled: bool) -> Self {
        self.debug_trap = enabled;
        self
    }

    /// Translate `source` into a [`Program`].
    ///
    /// Source is read as bytes, so it need not be UTF-8. The program never
    /// holds more instructions (END excluded) than `source` has bytes.
    pub fn translate<S>(&self, source: &S) -> Result<Program, TranslateError>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let src = source.as_ref();
        let mut code: Vec<Instruction> = Vec::with_capacity(src.len() + 1);
        // (instruction index of the BEQZ slot, source offset of its '[')
        let mut loops: Vec<(usize, usize)> = Vec::new();
        let mut p = 0;

        while p < src.len() {
            match src[p] {
                b'[' => {
                    if let Some(limit) = self.max_nesting {
                        if loops.len() >= limit {
                            return Err(TranslateError::NestingTooDeep { pos: p, limit });
                        }
                    }
                    loops.push((code.len(), p));
                    // Patched when the matching ']' shows up.
                    code.push(Instruction::END);
                    p += 1;
                }
                b']' => {
                    let Some((open, _)) = loops.pop() else {
                        return Err(TranslateError::UnmatchedBracket {
                            pos: p,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    let delta = (code.len() - open) as i64;
                    code[open] = pack(BEQZ, delta, p)?;
                    code.push(pack(BNEZ, -delta, p)?);
                    p += 1;
                }
                b'+' | b'-' => {
                    let (net, end) = fold(src, p, b'+', b'-');
                    if net != 0 {
                        code.push(pack(ADD, net, p)?);
                    }
                    p = end;
                }
                b'>' | b'<' => {
                    let (net, end) = fold(src, p, b'>', b'<');
                    if net != 0 {
                        code.push(pack(MOV, net, p)?);
                    }
                    p = end;
                }
                b'.' => {
                    code.push(Instruction::call(Func::Putc));
                    p += 1;
                }
                b',' => {
                    code.push(Instruction::call(Func::Getc));
                    p += 1;
                }
                b'?' if self.debug_trap => {
                    code.push(Instruction::call(Func::Debug));
                    p += 1;
                }
                _ => p += 1,
            }
        }

        if let Some(&(_, pos)) = loops.last() {
            return Err(TranslateError::UnmatchedBracket {
                pos,
                kind: UnmatchedBracketKind::Open,
            });
        }

        debug!(source_len = src.len(), instructions = code.len(), "translated program");
        code.push(Instruction::END);
        Ok(Program::from_code(code))
    }
}

/// Translate with default settings: unlimited nesting, `?` is a comment.
pub fn translate<S>(source: &S) -> Result<Program, TranslateError>
where
    S: AsRef<[u8]> + ?Sized,
{
    Translator::new().translate(source)
}

/// Sum a maximal run of `inc`/`dec` symbols starting at `start`.
/// Returns the net delta and the offset just past the run.
fn fold(src: &[u8], start: usize, inc: u8, dec: u8) -> (i64, usize) {
    let mut net = 0i64;
    let mut p = start;
    while let Some(&c) = src.get(p) {
        if c == inc {
            net += 1;
        } else if c == dec {
            net -= 1;
        } else if !is_c_space(c) {
            break;
        }
        p += 1;
    }
    (net, p)
}

/// The C locale `isspace` set, which includes vertical tab.
fn is_c_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn pack(op: i32, value: i64, pos: usize) -> Result<Instruction, TranslateError> {
    i32::try_from(value)
        .ok()
        .and_then(|imm| Instruction::new(op, imm))
        .ok_or(TranslateError::ImmediateOutOfRange { pos, value })
}
