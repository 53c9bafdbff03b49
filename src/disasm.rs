//! Human-readable views of a [`Program`].

use std::fmt::Write as _;

use crate::bytecode::{ADD, BEQZ, BNEZ, CALL, Func, Instruction, MOV, Program};

/// Render one instruction at index `pc`.
///
/// Branches show the absolute index they continue at, folded runs show a
/// direction symbol and a count, calls show their source symbol.
pub fn render(pc: usize, insn: Instruction) -> String {
    let n = insn.imm();
    match insn.op() {
        BEQZ => format!("[{}", target(pc, n)),
        BNEZ => format!("]{}", target(pc, n)),
        ADD => format!("{}{}", if n > 0 { '+' } else { '-' }, n.unsigned_abs()),
        MOV => format!("{}{}", if n > 0 { '>' } else { '<' }, n.unsigned_abs()),
        CALL => match Func::from_imm(n) {
            Some(func) => func.symbol().to_string(),
            None => format!("call {n}"),
        },
        _ => format!("{insn:?}"),
    }
}

fn target(pc: usize, n: i32) -> i64 {
    pc as i64 + n as i64 + 1
}

/// A full listing, one line per instruction, END not included.
pub fn listing(program: &Program) -> String {
    let mut out = String::from("  Bytecode:\n");
    for (pc, &insn) in program.body().iter().enumerate() {
        let _ = writeln!(out, " {pc:4}: {}", render(pc, insn));
    }
    out
}

/// Expand a program back into source symbols.
///
/// Translating the result runs the same way as `program`. Neighbouring
/// instructions of one fold category merge on the way back, so the
/// instruction count can shrink.
pub fn to_source(program: &Program) -> String {
    let mut out = String::with_capacity(program.len());
    for &insn in program.body() {
        let n = insn.imm();
        let count = n.unsigned_abs() as usize;
        match insn.op() {
            BEQZ => out.push('['),
            BNEZ => out.push(']'),
            ADD => out.extend(std::iter::repeat_n(if n > 0 { '+' } else { '-' }, count)),
            MOV => out.extend(std::iter::repeat_n(if n > 0 { '>' } else { '<' }, count)),
            CALL => {
                if let Some(func) = Func::from_imm(n) {
                    out.push(func.symbol());
                }
            }
            _ => {}
        }
    }
    out
}
