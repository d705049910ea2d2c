//! Text rendering of the dashboard view.

use std::fmt;

use super::view::DashboardView;
use crate::services::dashboard::{DayCell, DayColor};

/// Calendar columns, one week per row.
const WEEK: usize = 7;

/// Renders the whole screen for a view snapshot.
pub struct Screen<'a>(pub &'a DashboardView);

impl DayColor {
    /// Short tag standing in for the cell color.
    pub fn tag(&self) -> &'static str {
        match self {
            DayColor::Empty => "--",
            DayColor::NotReady => "NR",
            DayColor::InProcess => "IP",
            DayColor::Success => "OK",
            DayColor::Skipped => "MK",
        }
    }
}

struct Cell<'a> {
    cell: &'a DayCell,
    selected: bool,
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.selected { ('<', '>') } else { ('[', ']') };
        let marker = if self.cell.completed { '*' } else { ' ' };
        write!(
            f,
            "{open}{:>2} {}{marker}{close}",
            self.cell.day,
            self.cell.color.tag()
        )
    }
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        let Some(principal) = view.principal() else {
            writeln!(f, "Login with Google")?;
            writeln!(f, "Type `login` to sign in.")?;
            if let Some(notice) = view.notice() {
                writeln!(f, "! {notice}")?;
            }
            return Ok(());
        };

        writeln!(f, "Dashboard Ramadan - {}", principal.greeting_name())?;
        match view.selected_day() {
            Some(day) if view.is_skipped(day) => writeln!(f, "Mokel Day {day}")?,
            Some(day) => writeln!(f, "Puasa Day {day}")?,
            None => writeln!(f, "Puasa Day")?,
        }
        if let Some(notice) = view.notice() {
            writeln!(f, "! {notice}")?;
        }
        writeln!(f)?;

        let stats = view.stats();
        for week in stats.days.chunks(WEEK) {
            let row: Vec<String> = week
                .iter()
                .map(|cell| {
                    Cell {
                        cell,
                        selected: view.selected_day() == Some(cell.day),
                    }
                    .to_string()
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        writeln!(f)?;

        if view.selected_day().is_some() {
            for form in view.forms() {
                let verb = if form.updating { "Update" } else { "Add" };
                writeln!(f, "{:<8} [{verb} {}] {}", form.label, form.category, form.draft)?;
            }
            writeln!(f)?;
        }

        let counts = stats.status_counts;
        writeln!(
            f,
            "Not Ready: {}  In Process: {}  Success: {}",
            counts.not_ready, counts.in_process, counts.success
        )?;
        let averages: Vec<String> = stats
            .categories
            .iter()
            .map(|c| format!("{} {}%", c.label, c.average))
            .collect();
        writeln!(f, "{}", averages.join("  "))?;
        writeln!(f)?;

        for task in view.visible_tasks() {
            let status = task.status();
            let skipped = if view.is_skipped(task.day) { " (mokel)" } else { "" };
            write!(
                f,
                "#{} {}: {} (Day {}) - {} [{}%]{skipped}",
                task.id,
                task.task_type,
                task.content,
                task.day,
                status.label(),
                task.progress
            )?;
            let actions = view.actions_for(task);
            if actions.mark_in_process {
                write!(f, " [progress]")?;
            }
            if actions.mark_success {
                write!(f, " [done]")?;
            }
            writeln!(f, " [edit] [delete]")?;
        }
        Ok(())
    }
}
