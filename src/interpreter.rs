//! Bytecode interpreter.
//!
//! The current cell lives in a register while the pointer stays put; it is
//! written back to the tape only when the pointer moves, before a debug trap,
//! and once more when the run ends.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::bytecode::{ADD, BEQZ, BNEZ, CALL, Func, MOV, Program};
use crate::stats::Stats;
use crate::tape::Tape;

/// Errors that can stop a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A pointer move left the tape under [`TapePolicy::Strict`](crate::TapePolicy::Strict).
    #[error("Pointer out of bounds at instruction {pc} (ptr={ptr}, delta={delta})")]
    PointerOutOfBounds { pc: usize, ptr: usize, delta: i32 },

    /// Reading input or writing output failed.
    #[error("I/O error at instruction {pc}: {source}")]
    Io { pc: usize, #[source] source: io::Error },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },
}

/// What `,` stores when the input stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Set the cell to 0.
    #[default]
    Zero,
    /// Leave the cell as it was.
    Unchanged,
    /// Set the cell to 255.
    AllOnes,
}

/// Machine state handed to the debug trap.
#[derive(Debug)]
pub struct TrapState<'a> {
    pub pc: usize,
    pub ptr: usize,
    pub cell: u8,
    pub tape: &'a [u8],
}

type TrapHook = Box<dyn FnMut(&TrapState<'_>)>;

/// Executes translated programs against a [`Tape`], reading from `R` and
/// writing to `W`.
pub struct Interpreter<R, W> {
    input: R,
    output: W,
    eof: EofPolicy,
    max_steps: Option<u64>,
    trap: Option<TrapHook>,
}

impl<R: Read, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            eof: EofPolicy::default(),
            max_steps: None,
            trap: None,
        }
    }

    pub fn eof_policy(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    /// Abort a run after `limit` instructions.
    pub fn max_steps(mut self, limit: Option<u64>) -> Self {
        self.max_steps = limit;
        self
    }

    /// Install a callback for `?` debug-trap calls. Without one they do nothing.
    pub fn set_debug_trap<F>(&mut self, trap: F)
    where
        F: FnMut(&TrapState<'_>) + 'static,
    {
        self.trap = Some(Box::new(trap));
    }

    /// Give back the I/O streams.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Run `program` to its END instruction.
    ///
    /// The caller provides a zeroed tape. Counters are added to `stats` when
    /// given. Output is flushed before returning, on success or error.
    ///
    /// # Panics
    ///
    /// On an unknown opcode or call selector, or a branch that leaves the
    /// program. The translator never produces either.
    pub fn run(
        &mut self,
        program: &Program,
        tape: &mut Tape,
        stats: Option<&mut Stats>,
    ) -> Result<(), RunError> {
        let mut scratch = Stats::default();
        let stats = stats.unwrap_or(&mut scratch);
        let code = program.code();

        debug!(instructions = program.len(), tape_len = tape.len(), "run started");

        let mut pc = 0usize;
        let mut ptr = 0usize;
        let mut cur = tape.cells()[0];
        let mut steps = 0u64;

        let result = loop {
            let Some(&insn) = code.get(pc) else {
                panic!("program counter {pc} escaped a program of {} instructions", code.len());
            };
            if insn.is_end() {
                break Ok(());
            }
            if let Some(limit) = self.max_steps {
                if steps >= limit {
                    break Err(RunError::StepLimitExceeded { limit });
                }
            }
            steps += 1;
            stats.ops += 1;

            let n = insn.imm();
            match insn.op() {
                BEQZ => {
                    let taken = cur == 0;
                    stats.beqz.record(taken);
                    if taken {
                        pc = branch(pc, n);
                    }
                }
                BNEZ => {
                    let taken = cur != 0;
                    stats.bnez.record(taken);
                    if taken {
                        pc = branch(pc, n);
                    }
                }
                ADD => {
                    stats.adds += 1;
                    cur = cur.wrapping_add(n as u8);
                }
                MOV => {
                    stats.moves += 1;
                    tape.cells_mut()[ptr] = cur;
                    let Some(next) = tape.offset(ptr, n) else {
                        break Err(RunError::PointerOutOfBounds { pc, ptr, delta: n });
                    };
                    ptr = next;
                    cur = tape.cells()[ptr];
                }
                CALL => {
                    stats.calls += 1;
                    match Func::from_imm(n) {
                        Some(Func::Putc) => {
                            if let Err(source) = self.output.write_all(&[cur]) {
                                break Err(RunError::Io { pc, source });
                            }
                        }
                        Some(Func::Getc) => match self.read_byte() {
                            Ok(Some(b)) => cur = b,
                            Ok(None) => match self.eof {
                                EofPolicy::Zero => cur = 0,
                                EofPolicy::Unchanged => {}
                                EofPolicy::AllOnes => cur = u8::MAX,
                            },
                            Err(source) => break Err(RunError::Io { pc, source }),
                        },
                        Some(Func::Debug) => {
                            if let Some(trap) = self.trap.as_mut() {
                                tape.cells_mut()[ptr] = cur;
                                trap(&TrapState { pc, ptr, cell: cur, tape: tape.cells() });
                            }
                        }
                        None => panic!("unknown call selector {n} at instruction {pc}"),
                    }
                }
                op => panic!("invalid opcode {op:#x} at instruction {pc}"),
            }
            pc += 1;
        };

        tape.cells_mut()[ptr] = cur;
        debug!(ops = stats.ops, ok = result.is_ok(), "run finished");

        let flushed = self.output.flush();
        match (result, flushed) {
            (Err(e), _) => Err(e),
            (Ok(()), Err(source)) => Err(RunError::Io { pc, source }),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Read one byte, flushing pending output first so prompts show up.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.output.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

fn branch(pc: usize, delta: i32) -> usize {
    pc.checked_add_signed(delta as isize)
        .unwrap_or_else(|| panic!("branch at instruction {pc} by {delta} leaves the program"))
}
