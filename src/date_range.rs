//! Hire-date ranges and the range filter control.

use time::{Date, Month};

use crate::error::ValidationError;
use crate::utils::date_format::parse_iso_date;

/// How far back a date may lie, in years before "today".
pub const MAX_YEARS_BACK: i32 = 100;

/// The window `[min, today]` every picked date must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    min: Date,
    today: Date,
}

impl DateBounds {
    /// Bounds ending at `today` and starting [`MAX_YEARS_BACK`] years earlier.
    #[must_use]
    pub fn ending(today: Date) -> Self {
        let year = today.year() - MAX_YEARS_BACK;
        // Feb 29 has no counterpart in most years
        let min = today
            .replace_year(year)
            .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
            .unwrap_or(Date::MIN);
        Self { min, today }
    }

    #[must_use]
    pub fn min(&self) -> Date {
        self.min
    }

    #[must_use]
    pub fn today(&self) -> Date {
        self.today
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.min <= date && date <= self.today
    }

    /// Clamps `date` into the window.
    #[must_use]
    pub fn clamp(&self, date: Date) -> Date {
        date.clamp(self.min, self.today)
    }

    /// Checks a range before it is used as a query.
    pub fn check_range(&self, range: &DateRange) -> Result<(), ValidationError> {
        if range.start > self.today || range.end > self.today {
            return Err(ValidationError::FutureRange);
        }
        if range.start < self.min || range.end < self.min {
            return Err(ValidationError::RangeTooOld);
        }
        if range.start > range.end {
            return Err(ValidationError::RangeInverted);
        }
        Ok(())
    }

    /// Checks a single picked date.
    pub fn check_date(&self, date: Date) -> Result<(), ValidationError> {
        if date > self.today {
            Err(ValidationError::DateInFuture)
        } else if date < self.min {
            Err(ValidationError::DateTooOld)
        } else {
            Ok(())
        }
    }
}

/// An inclusive hire-date range. Construction doesn't validate; use
/// [`DateBounds::check_range`] or build one through [`DateRangeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The start/end pickers of the hire-date filter.
///
/// Each pick is validated as it happens: a date outside the bounds is
/// rejected and its field emptied. Submitting requires both fields and a
/// non-inverted range.
#[derive(Debug, Clone)]
pub struct DateRangeFilter {
    bounds: DateBounds,
    start: Option<Date>,
    end: Option<Date>,
    error: Option<ValidationError>,
}

impl DateRangeFilter {
    #[must_use]
    pub fn new(bounds: DateBounds) -> Self {
        Self {
            bounds,
            start: None,
            end: None,
            error: None,
        }
    }

    #[must_use]
    pub fn start(&self) -> Option<Date> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<Date> {
        self.end
    }

    /// The rejection currently shown to the user, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_start(&mut self, value: Option<Date>) -> Result<(), ValidationError> {
        let checked = self.check(value);
        self.start = checked.as_ref().ok().copied().flatten();
        checked.map(|_| ())
    }

    pub fn set_end(&mut self, value: Option<Date>) -> Result<(), ValidationError> {
        let checked = self.check(value);
        self.end = checked.as_ref().ok().copied().flatten();
        checked.map(|_| ())
    }

    /// Sets the start from a picker value (`YYYY-MM-DD`, empty for none).
    pub fn pick_start(&mut self, value: &str) -> Result<(), ValidationError> {
        let date = self.parse(value)?;
        self.set_start(date)
    }

    /// Sets the end from a picker value (`YYYY-MM-DD`, empty for none).
    pub fn pick_end(&mut self, value: &str) -> Result<(), ValidationError> {
        let date = self.parse(value)?;
        self.set_end(date)
    }

    /// Validates the pair and yields the range to search.
    pub fn submit(&mut self) -> Result<DateRange, ValidationError> {
        self.error = None;
        let result = self.validate();
        if let Err(error) = &result {
            debug!(%error, "date range submission blocked");
            self.error = Some(error.clone());
        }
        result
    }

    /// Empties both fields. The caller goes back to status filtering.
    pub fn clear(&mut self) -> Option<DateRange> {
        self.start = None;
        self.end = None;
        self.error = None;
        None
    }

    fn validate(&self) -> Result<DateRange, ValidationError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(ValidationError::MissingDates);
        };
        if start > self.bounds.today() || end > self.bounds.today() {
            return Err(ValidationError::DatesInFuture);
        }
        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        self.bounds.check_date(start)?;
        self.bounds.check_date(end)?;
        Ok(DateRange::new(start, end))
    }

    fn check(&mut self, value: Option<Date>) -> Result<Option<Date>, ValidationError> {
        let Some(date) = value else {
            return Ok(None);
        };
        match self.bounds.check_date(date) {
            Ok(()) => {
                self.error = None;
                Ok(Some(date))
            }
            Err(error) => {
                warn!(%date, %error, "picked date rejected");
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn parse(&mut self, value: &str) -> Result<Option<Date>, ValidationError> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        parse_iso_date(value.trim()).map(Some).map_err(|reason| {
            let error = ValidationError::InvalidDate(reason);
            self.error = Some(error.clone());
            error
        })
    }
}
