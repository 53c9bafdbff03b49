//! A Brainfuck bytecode translator and interpreter.
//!
//! Source text is translated once into a compact [`Program`] of packed
//! [`Instruction`]s, then executed against a fixed-size [`Tape`].
//!
//! Features and behaviors:
//! - Runs of `+`/`-` and `>`/`<` fold into one instruction carrying the net delta;
//!   a run that cancels out disappears.
//! - Loops become a branch-if-zero / branch-if-nonzero pair resolved at
//!   translation time; unmatched brackets are reported as errors.
//! - Characters outside `><+-.,[]` are comments. `?` can be enabled as a debug trap.
//! - Cell arithmetic wraps modulo 256. Leaving the tape is an error unless the
//!   tape wraps ([`TapePolicy::Wrap`]).
//! - Input `,` on EOF sets the cell to 0 by default ([`EofPolicy`]).
//!
//! Quick start:
//!
//! ```
//! use bytebf::{Interpreter, Stats, Tape, translate};
//!
//! let program = translate("++++++++[>++++++++<-]>+.").unwrap();
//! let mut tape = Tape::default();
//! let mut stats = Stats::default();
//! let mut vm = Interpreter::new(std::io::empty(), Vec::new());
//! vm.run(&program, &mut tape, Some(&mut stats)).unwrap();
//! assert_eq!(vm.into_inner().1, b"A");
//! assert_eq!(stats.bnez.taken, 7);
//! ```

pub mod bytecode;
pub mod cli_util;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod disasm;
pub mod interpreter;
pub mod stats;
pub mod tape;
pub mod theme;
pub mod translator;

pub use bytecode::{Func, Instruction, Program};
pub use interpreter::{EofPolicy, Interpreter, RunError, TrapState};
pub use stats::{BranchStats, Stats};
pub use tape::{DEFAULT_TAPE_SIZE, Tape, TapePolicy};
pub use translator::{TranslateError, Translator, UnmatchedBracketKind, translate};
