use crate::report::{AuditReport, Discrepancy, DiscrepancyKind};

/// Rows moved by PageUp / PageDown.
pub const PAGE: usize = 10;

/// High-level input actions for the TUI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    CycleFilter,
    ClearFilter,
    ToggleHelp,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct AppState {
    pub report: AuditReport,
    /// Index into `visible()`.
    pub selected: usize,
    pub filter: Option<DiscrepancyKind>,
    help_open: bool,
}

impl AppState {
    pub fn new(report: AuditReport) -> Self {
        Self { report, selected: 0, filter: None, help_open: false }
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    /// Discrepancies passing the current filter.
    pub fn visible(&self) -> Vec<&Discrepancy> {
        self.report
            .discrepancies
            .iter()
            .filter(|d| self.filter.map_or(true, |kind| d.kind == kind))
            .collect()
    }

    pub fn selected_discrepancy(&self) -> Option<&Discrepancy> {
        self.visible().get(self.selected).copied()
    }

    /// Next kind that has at least one entry, wrapping back to "all".
    fn next_filter(&self) -> Option<DiscrepancyKind> {
        let counts = self.report.counts_by_kind();
        let start = match self.filter {
            None => 0,
            Some(kind) => DiscrepancyKind::ALL.iter().position(|&k| k == kind).map_or(0, |i| i + 1),
        };
        DiscrepancyKind::ALL[start..].iter().copied().find(|k| counts.contains_key(k))
    }

    fn move_by(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected.saturating_add_signed(delta);
        self.selected = next.min(len - 1);
    }

    /// Apply an input; returns true when the selection or filter changed.
    pub fn handle_input(&mut self, action: InputAction) -> bool {
        if let InputAction::ToggleHelp = action {
            self.help_open = !self.help_open;
            return false;
        }
        if self.help_open {
            return false;
        }
        let before = (self.selected, self.filter);
        match action {
            InputAction::Up => self.move_by(-1),
            InputAction::Down => self.move_by(1),
            InputAction::PageUp => self.move_by(-(PAGE as isize)),
            InputAction::PageDown => self.move_by(PAGE as isize),
            InputAction::Home => self.selected = 0,
            InputAction::End => self.selected = self.visible().len().saturating_sub(1),
            InputAction::CycleFilter => {
                self.filter = self.next_filter();
                self.selected = 0;
            }
            InputAction::ClearFilter => {
                self.filter = None;
                self.selected = 0;
            }
            InputAction::ToggleHelp => {}
        }
        before != (self.selected, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(round: &str, kind: DiscrepancyKind) -> Discrepancy {
        Discrepancy {
            round_id: round.into(),
            kind,
            seat: None,
            field: None,
            computed: None,
            recorded: None,
            description: String::new(),
        }
    }

    #[test]
    fn filter_skips_absent_kinds() {
        let report = AuditReport {
            rounds_processed: 3,
            rounds_failed: 0,
            discrepancies: vec![
                entry("a", DiscrepancyKind::Mismatch),
                entry("b", DiscrepancyKind::StakeLimit),
                entry("c", DiscrepancyKind::Mismatch),
            ],
        };
        let mut app = AppState::new(report);
        assert!(app.handle_input(InputAction::CycleFilter));
        assert_eq!(app.filter, Some(DiscrepancyKind::Mismatch));
        assert_eq!(app.visible().len(), 2);
        app.handle_input(InputAction::CycleFilter);
        assert_eq!(app.filter, Some(DiscrepancyKind::StakeLimit));
        app.handle_input(InputAction::CycleFilter);
        assert_eq!(app.filter, None);
    }
}
