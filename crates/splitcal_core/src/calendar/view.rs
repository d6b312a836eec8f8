//! Reference date and view mode for the calendar screen.
//!
//! # Invariants
//! - Month navigation clamps the day to the target month's length.
//! - Week navigation moves exactly 7 days.

use super::grid::{build_grid, CalendarDay, GridOptions, ViewMode};
use crate::model::event::CalendarEvent;
use chrono::{Duration, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    pub reference: NaiveDate,
    pub mode: ViewMode,
}

impl CalendarView {
    pub fn new(reference: NaiveDate, mode: ViewMode) -> Self {
        Self { reference, mode }
    }

    /// Moves one page back (one month or one week).
    pub fn previous(&mut self) {
        let shifted = match self.mode {
            ViewMode::Month => self.reference.checked_sub_months(Months::new(1)),
            ViewMode::Week => self.reference.checked_sub_signed(Duration::days(7)),
        };
        if let Some(reference) = shifted {
            self.reference = reference;
        }
    }

    /// Moves one page forward (one month or one week).
    pub fn next(&mut self) {
        let shifted = match self.mode {
            ViewMode::Month => self.reference.checked_add_months(Months::new(1)),
            ViewMode::Week => self.reference.checked_add_signed(Duration::days(7)),
        };
        if let Some(reference) = shifted {
            self.reference = reference;
        }
    }

    /// Selects a day; new events default to the selected day.
    pub fn select(&mut self, day: NaiveDate) {
        self.reference = day;
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Header label such as `March 2024`.
    pub fn title(&self) -> String {
        self.reference.format("%B %Y").to_string()
    }

    pub fn grid(
        &self,
        events: &[CalendarEvent],
        today: NaiveDate,
        options: &GridOptions,
    ) -> Vec<CalendarDay> {
        build_grid(self.reference, self.mode, events, today, options)
    }
}
