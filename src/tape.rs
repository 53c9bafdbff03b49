use std::num::NonZeroUsize;

/// Default number of cells, matching the classic Brainfuck tape.
pub const DEFAULT_TAPE_SIZE: NonZeroUsize = NonZeroUsize::new(30_000).unwrap();

/// What happens when a pointer move leaves the tape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TapePolicy {
    /// Stop the run with [`RunError::PointerOutOfBounds`](crate::RunError::PointerOutOfBounds).
    #[default]
    Strict,
    /// Wrap around modulo the tape length.
    Wrap,
}

/// A fixed-size byte tape owned by one run at a time.
///
/// Reusing a tape across a batch is fine as long as [`Tape::reset`] is called
/// between runs.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    policy: TapePolicy,
}

impl Tape {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            cells: vec![0; size.get()],
            policy: TapePolicy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: TapePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TapePolicy {
        self.policy
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.cells.fill(0);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Resolve `ptr + delta` under the tape policy. `None` means the move
    /// left the tape under [`TapePolicy::Strict`].
    pub(crate) fn offset(&self, ptr: usize, delta: i32) -> Option<usize> {
        let len = self.cells.len();
        match self.policy {
            TapePolicy::Strict => ptr.checked_add_signed(delta as isize).filter(|&p| p < len),
            TapePolicy::Wrap => {
                let step = (delta as i64).rem_euclid(len as i64) as usize;
                Some((ptr + step) % len)
            }
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Tape::new(DEFAULT_TAPE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(size: usize, policy: TapePolicy) -> Tape {
        Tape::new(NonZeroUsize::new(size).unwrap()).with_policy(policy)
    }

    #[test]
    fn strict_rejects_moves_off_either_end() {
        let t = tape(3, TapePolicy::Strict);
        assert_eq!(t.offset(0, -1), None);
        assert_eq!(t.offset(2, 1), None);
        assert_eq!(t.offset(1, 1), Some(2));
        assert_eq!(t.offset(2, -2), Some(0));
    }

    #[test]
    fn wrap_moves_modulo_length() {
        let t = tape(3, TapePolicy::Wrap);
        assert_eq!(t.offset(0, -1), Some(2));
        assert_eq!(t.offset(2, 1), Some(0));
        assert_eq!(t.offset(1, -7), Some(0));
        assert_eq!(t.offset(1, 300), Some(1));
    }

    #[test]
    fn reset_zeroes_cells() {
        let mut t = tape(4, TapePolicy::Strict);
        t.cells_mut()[2] = 9;
        t.reset();
        assert_eq!(t.cells(), &[0, 0, 0, 0]);
        assert_eq!(Tape::default().len(), 30_000);
    }
}
