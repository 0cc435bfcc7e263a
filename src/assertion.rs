use prettytable::{Cell, Row, Table};
use std::collections::BTreeMap;

use crate::phase::Phase;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub checked: u32,
    pub passed: u32,
    pub failed: u32,
    /// Times the phase ran to its end.
    pub completed: u32,
}

impl Counts {
    fn add(&mut self, other: Counts) {
        self.checked += other.checked;
        self.passed += other.passed;
        self.failed += other.failed;
        self.completed += other.completed;
    }
}

/// Per phase tally of every check the driver evaluated.
#[derive(Debug, Default, Clone)]
pub struct AssertionStats {
    phases: BTreeMap<Phase, Counts>,
}

impl AssertionStats {
    pub fn record(&mut self, phase: Phase, ok: bool) {
        let c = self.phases.entry(phase).or_default();
        c.checked += 1;
        match ok {
            true => c.passed += 1,
            false => c.failed += 1,
        }
    }

    pub fn complete(&mut self, phase: Phase) {
        self.phases.entry(phase).or_default().completed += 1;
    }

    pub fn get(&self, phase: Phase) -> Counts {
        self.phases.get(&phase).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Counts {
        self.phases.values().fold(Counts::default(), |mut acc, c| {
            acc.add(*c);
            acc
        })
    }

    pub fn result_str(&self, phase: Phase) -> String {
        let c = self.get(phase);
        format!(
            "Assertion {}: Checked: {}, Passed: {}, Failed: {}.",
            phase, c.checked, c.passed, c.failed
        )
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(Row::new(vec![
            Cell::new("phase"),
            Cell::new("checked"),
            Cell::new("passed"),
            Cell::new("failed"),
            Cell::new("completed"),
        ]));
        for (phase, c) in self.phases.iter() {
            table.add_row(Row::new(vec![
                Cell::new(phase.name()),
                Cell::new(&c.checked.to_string()),
                Cell::new(&c.passed.to_string()),
                Cell::new(&c.failed.to_string()),
                Cell::new(&c.completed.to_string()),
            ]));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_phase_and_total() {
        let mut stats = AssertionStats::default();
        stats.record(Phase::Bypass, true);
        stats.record(Phase::Bypass, false);
        stats.record(Phase::ClockDiv, true);
        assert_eq!(
            stats.get(Phase::Bypass),
            Counts { checked: 2, passed: 1, failed: 1, completed: 0 }
        );
        assert_eq!(stats.get(Phase::RaceBits), Counts::default());
        assert_eq!(stats.total().checked, 3);
        assert_eq!(
            stats.result_str(Phase::ClockDiv),
            "Assertion clock_div: Checked: 1, Passed: 1, Failed: 0."
        );
    }

    #[test]
    fn table_has_a_row_per_recorded_phase() {
        let mut stats = AssertionStats::default();
        stats.record(Phase::TileSelect, true);
        stats.record(Phase::AndBuffer, true);
        assert_eq!(stats.table().len(), 2);
    }

    #[test]
    fn phase_without_checks_still_completes() {
        let mut stats = AssertionStats::default();
        stats.complete(Phase::Init);
        assert_eq!(stats.get(Phase::Init).checked, 0);
        assert_eq!(stats.get(Phase::Init).completed, 1);
        assert_eq!(stats.total().completed, 1);
    }
}
