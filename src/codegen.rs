//! C source backend.
//!
//! Walks the same [`Program`] the interpreter runs and writes an equivalent
//! C translation unit. BEQZ/BNEZ pairs become `while` loops. Compiling the
//! result is up to the user.

use std::fmt::Write as _;
use std::num::NonZeroUsize;

use crate::bytecode::{ADD, BEQZ, BNEZ, CALL, Func, MOV, Program};
use crate::interpreter::EofPolicy;
use crate::tape::{DEFAULT_TAPE_SIZE, TapePolicy};

/// Settings baked into the generated source.
#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    pub tape_size: NonZeroUsize,
    pub tape: TapePolicy,
    pub eof: EofPolicy,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            tape: TapePolicy::default(),
            eof: EofPolicy::default(),
        }
    }
}

const STRICT_MOVE: &str = r#"static size_t move(size_t i, long d) {
    long n = (long) i + d;
    if (n < 0 || n >= TAPE_SIZE) {
        fprintf(stderr, "pointer out of bounds (ptr=%zu, delta=%ld)\n", i, d);
        exit(1);
    }
    return (size_t) n;
}
"#;

const WRAP_MOVE: &str = r#"static size_t move(size_t i, long d) {
    long n = ((long) i + d) % TAPE_SIZE;
    if (n < 0) {
        n += TAPE_SIZE;
    }
    return (size_t) n;
}
"#;

/// Generate a C program that behaves like running `program` in the interpreter.
pub fn emit_c(program: &Program, opts: &EmitOptions) -> String {
    let mut out = String::new();
    out.push_str("#include <stdio.h>\n#include <stdlib.h>\n\n");
    let _ = writeln!(out, "#define TAPE_SIZE {}L\n", opts.tape_size);
    out.push_str("static unsigned char tape[TAPE_SIZE];\n\n");
    // Unused statics trip -Wunused-function.
    if program.body().iter().any(|insn| insn.op() == MOV) {
        out.push_str(match opts.tape {
            TapePolicy::Strict => STRICT_MOVE,
            TapePolicy::Wrap => WRAP_MOVE,
        });
        out.push('\n');
    }
    out.push_str("int main(void) {\n    size_t i = 0;\n    int c;\n\n");

    let mut depth = 1usize;
    for &insn in program.body() {
        let n = insn.imm();
        if insn.op() == BNEZ {
            depth -= 1;
        }
        let line = match insn.op() {
            BEQZ => "while (tape[i]) {".to_string(),
            BNEZ => "}".to_string(),
            ADD if n < 0 => format!("tape[i] -= {};", n.unsigned_abs()),
            ADD => format!("tape[i] += {n};"),
            MOV => format!("i = move(i, {n});"),
            CALL => match Func::from_imm(n) {
                Some(Func::Putc) => "putchar(tape[i]);".to_string(),
                Some(Func::Getc) => match opts.eof {
                    EofPolicy::Zero => "c = getchar(); tape[i] = c == EOF ? 0 : c;".to_string(),
                    EofPolicy::Unchanged => "c = getchar(); if (c != EOF) tape[i] = c;".to_string(),
                    EofPolicy::AllOnes => "c = getchar(); tape[i] = c == EOF ? 255 : c;".to_string(),
                },
                Some(Func::Debug) => "/* debug trap */".to_string(),
                None => format!("/* unknown call {n} */"),
            },
            _ => continue,
        };
        if insn.op() == CALL && Func::from_imm(n) == Some(Func::Getc) {
            // Prompts printed so far must be visible before blocking on input.
            let _ = writeln!(out, "{}fflush(stdout);", "    ".repeat(depth));
        }
        let _ = writeln!(out, "{}{line}", "    ".repeat(depth));
        if insn.op() == BEQZ {
            depth += 1;
        }
    }

    out.push_str("\n    (void) tape;\n    (void) i;\n    (void) c;\n    return 0;\n}\n");
    out
}
