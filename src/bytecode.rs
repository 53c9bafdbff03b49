//! Packed instruction encoding shared by the translator, the interpreter and
//! every backend that walks a [`Program`].
//!
//! An [`Instruction`] is a single `i32`: the opcode lives in the low 6 bits and
//! a signed immediate fills the remaining 26 bits. Opcodes are bit flags, so a
//! whole category can be tested with one mask (`op & EXE != 0`).

use std::fmt;

/// Terminator. The immediate is unused.
pub const END: i32 = 0;
/// Move the tape pointer by a signed delta.
pub const MOV: i32 = 1 << 0;
/// Add a signed delta to the current cell (wraps modulo 256).
pub const ADD: i32 = 1 << 1;
/// Branch by the immediate when the current cell is zero.
pub const BEQZ: i32 = 1 << 2;
/// Branch by the immediate when the current cell is nonzero.
pub const BNEZ: i32 = 1 << 3;
/// Call the I/O primitive selected by the immediate.
pub const CALL: i32 = 1 << 4;

pub const OP_MASK: i32 = 0x3f;
pub const EXE: i32 = MOV | ADD;
pub const BR: i32 = BEQZ | BNEZ;

const IMM_SHIFT: u32 = 6;

/// Smallest immediate that survives packing.
pub const IMM_MIN: i32 = i32::MIN >> IMM_SHIFT;
/// Largest immediate that survives packing.
pub const IMM_MAX: i32 = i32::MAX >> IMM_SHIFT;

/// Selectors for the `CALL` opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    /// Write the current cell to the output stream.
    Putc = 0,
    /// Read one byte from the input stream into the current cell.
    Getc = 1,
    /// Invoke the debug trap, if one is installed.
    Debug = 2,
}

impl Func {
    pub fn from_imm(imm: i32) -> Option<Func> {
        match imm {
            0 => Some(Func::Putc),
            1 => Some(Func::Getc),
            2 => Some(Func::Debug),
            _ => None,
        }
    }

    /// The source symbol this call was translated from.
    pub fn symbol(self) -> char {
        match self {
            Func::Putc => '.',
            Func::Getc => ',',
            Func::Debug => '?',
        }
    }
}

/// One packed operation: opcode plus signed immediate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Instruction(i32);

impl Instruction {
    pub const END: Instruction = Instruction(END);

    /// Pack `op` and `imm`. Returns `None` if `imm` does not fit in 26 bits.
    pub fn new(op: i32, imm: i32) -> Option<Instruction> {
        debug_assert_eq!(op & !OP_MASK, 0, "opcode {op:#x} overflows the opcode field");
        if !(IMM_MIN..=IMM_MAX).contains(&imm) {
            return None;
        }
        Some(Instruction(((imm as u32) << IMM_SHIFT) as i32 | op))
    }

    pub fn call(func: Func) -> Instruction {
        Instruction((func as i32) << IMM_SHIFT | CALL)
    }

    pub fn op(self) -> i32 {
        self.0 & OP_MASK
    }

    pub fn imm(self) -> i32 {
        self.0 >> IMM_SHIFT
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_end(self) -> bool {
        self.0 == END
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.op() {
            END => "END",
            MOV => "MOV",
            ADD => "ADD",
            BEQZ => "BEQZ",
            BNEZ => "BNEZ",
            CALL => "CALL",
            _ => "???",
        };
        write!(f, "{name}({})", self.imm())
    }
}

/// A translated program: instructions at consecutive indices, terminated by a
/// single [`Instruction::END`].
///
/// Only the translator builds programs, which is what lets the interpreter
/// assume every branch has a partner.
#[derive(Clone, PartialEq, Eq)]
pub struct Program {
    code: Vec<Instruction>,
}

impl Program {
    pub(crate) fn from_code(code: Vec<Instruction>) -> Program {
        debug_assert_eq!(code.last().copied(), Some(Instruction::END));
        Program { code }
    }

    /// All instructions including the trailing END.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Instructions without the trailing END.
    pub fn body(&self) -> &[Instruction] {
        &self.code[..self.code.len() - 1]
    }

    /// Number of instructions excluding END.
    pub fn len(&self) -> usize {
        self.code.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.body()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks_negative_immediates() {
        let insn = Instruction::new(MOV, -7).unwrap();
        assert_eq!(insn.op(), MOV);
        assert_eq!(insn.imm(), -7);
        assert!(insn.op() & EXE != 0);
        assert!(insn.op() & BR == 0);
    }

    #[test]
    fn immediate_range_is_enforced() {
        assert!(Instruction::new(ADD, IMM_MAX).is_some());
        assert!(Instruction::new(ADD, IMM_MIN).is_some());
        assert!(Instruction::new(ADD, IMM_MAX + 1).is_none());
        assert!(Instruction::new(ADD, IMM_MIN - 1).is_none());
        assert_eq!(Instruction::new(ADD, IMM_MIN).unwrap().imm(), IMM_MIN);
    }

    #[test]
    fn call_selectors_decode() {
        let insn = Instruction::call(Func::Getc);
        assert_eq!(insn.op(), CALL);
        assert_eq!(Func::from_imm(insn.imm()), Some(Func::Getc));
        assert_eq!(Func::from_imm(9), None);
    }

    #[test]
    fn end_is_zero() {
        assert_eq!(Instruction::END.raw(), 0);
        assert!(Instruction::END.is_end());
        assert!(!Instruction::call(Func::Putc).is_end());
    }
}
