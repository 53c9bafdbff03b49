//! Execution counters filled in by the interpreter.

use std::fmt;

/// Occurrence and taken counts for one branch kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchStats {
    pub total: u64,
    pub taken: u64,
}

impl BranchStats {
    pub fn not_taken(&self) -> u64 {
        self.total - self.taken
    }

    pub(crate) fn record(&mut self, taken: bool) {
        self.total += 1;
        if taken {
            self.taken += 1;
        }
    }
}

/// Counters for one program run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Every instruction processed, END excluded.
    pub ops: u64,
    pub adds: u64,
    pub moves: u64,
    pub calls: u64,
    pub beqz: BranchStats,
    pub bnez: BranchStats,
}

impl Stats {
    pub fn branches(&self) -> u64 {
        self.beqz.total + self.bnez.total
    }

    pub fn taken_branches(&self) -> u64 {
        self.beqz.taken + self.bnez.taken
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 * 100.0 / whole as f64 }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Stats")?;
        writeln!(f, "         ops: {}", self.ops)?;
        writeln!(f, "        adds: {} ({:.1}%)", self.adds, percent(self.adds, self.ops))?;
        writeln!(f, "       moves: {} ({:.1}%)", self.moves, percent(self.moves, self.ops))?;
        writeln!(f, "       calls: {} ({:.1}%)", self.calls, percent(self.calls, self.ops))?;
        writeln!(
            f,
            "    branches: {} (taken {}, {:.1}%)",
            self.branches(),
            self.taken_branches(),
            percent(self.taken_branches(), self.branches())
        )?;
        for (name, b) in [("beqz", &self.beqz), ("bnez", &self.bnez)] {
            writeln!(
                f,
                "        {name}: {} (taken {}, {:.1}%)",
                b.total,
                b.taken,
                percent(b.taken, b.total)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_record_counts_taken_and_not_taken() {
        let mut b = BranchStats::default();
        b.record(true);
        b.record(false);
        b.record(false);
        assert_eq!(b.total, 3);
        assert_eq!(b.taken, 1);
        assert_eq!(b.not_taken(), 2);
    }

    #[test]
    fn report_includes_percentages() {
        let stats = Stats {
            ops: 10,
            adds: 5,
            moves: 2,
            calls: 1,
            beqz: BranchStats { total: 1, taken: 0 },
            bnez: BranchStats { total: 1, taken: 1 },
        };
        let report = stats.to_string();
        assert!(report.contains("ops: 10"));
        assert!(report.contains("adds: 5 (50.0%)"));
        assert!(report.contains("branches: 2 (taken 1, 50.0%)"));
        assert!(report.contains("bnez: 1 (taken 1, 100.0%)"));
    }

    #[test]
    fn empty_report_has_no_nan() {
        assert!(!Stats::default().to_string().contains("NaN"));
    }
}
