//! Current-year filler.

use chrono::{Datelike, Local, NaiveDate};

use tracing::warn;

use crate::dom::Document;

/// Attribute marking elements that should show the current year.
pub const YEAR_ATTRIBUTE: &str = "data-year";

/// Source of "today".
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Write the current year into every `[data-year]` element.
pub fn fill_years(document: &mut Document, clock: &dyn Clock) -> usize {
    let year = clock.today().year().to_string();
    let elements = match document.query_all(&format!("[{}]", YEAR_ATTRIBUTE)) {
        Ok(found) => found,
        Err(e) => {
            warn!("[horse] {}", e);
            return 0;
        }
    };
    for &element in &elements {
        document.set_text(element, &year);
    }
    elements.len()
}
