//! The add-employee form.
//!
//! Fields hold what the user entered. Nothing is validated while typing;
//! [`AddEmployeeForm::submit`] runs the checks in a fixed order and stops at
//! the first failure. The hire date is the exception: it comes from a picker
//! and is clamped into the allowed window as soon as it is picked.

use time::Date;

use crate::date_range::DateBounds;
use crate::employee::{Employee, NewEmployee};
use crate::error::{Error, ValidationError};
use crate::utils::date_format::{format_iso_date, iso_to_wire, parse_iso_date};

/// A validated form, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub employee: NewEmployee,
    pub manager_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AddEmployeeForm {
    bounds: DateBounds,
    roster: Vec<Employee>,
    id: String,
    first_name: String,
    last_name: String,
    position: String,
    /// Picker value, `YYYY-MM-DD`.
    hire_date: String,
    direct_reports: Vec<u64>,
    /// Selected manager id; empty while nothing is selected.
    manager_id: String,
    error: Option<String>,
}

impl AddEmployeeForm {
    /// Opens an empty form checked against `roster`.
    #[must_use]
    pub fn new(bounds: DateBounds, roster: Vec<Employee>) -> Self {
        Self {
            bounds,
            roster,
            id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            position: String::new(),
            hire_date: String::new(),
            direct_reports: Vec::new(),
            manager_id: String::new(),
            error: None,
        }
    }

    /// Message currently shown in the form's error dialog.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Employees offered as manager or direct report, sorted by name.
    #[must_use]
    pub fn choices(&self) -> Vec<&Employee> {
        let mut choices: Vec<&Employee> = self.roster.iter().collect();
        choices.sort_by(|a, b| a.name.cmp(&b.name));
        choices
    }

    #[must_use]
    pub fn hire_date(&self) -> &str {
        &self.hire_date
    }

    pub fn set_id(&mut self, value: impl Into<String>) {
        self.error = None;
        self.id = value.into();
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.error = None;
        self.first_name = value.into();
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.error = None;
        self.last_name = value.into();
    }

    pub fn set_position(&mut self, value: impl Into<String>) {
        self.error = None;
        self.position = value.into();
    }

    pub fn set_direct_reports(&mut self, ids: Vec<u64>) {
        self.error = None;
        self.direct_reports = ids;
    }

    pub fn set_manager(&mut self, id: Option<u64>) {
        self.error = None;
        self.manager_id = id.map(|id| id.to_string()).unwrap_or_default();
    }

    /// Takes a hire date from the picker.
    ///
    /// A date outside the window is reported and replaced by the nearest
    /// bound, which is then stored as if it had been picked.
    pub fn pick_hire_date(&mut self, date: Date) -> Result<(), ValidationError> {
        self.error = None;
        let clamped = self.bounds.clamp(date);
        self.hire_date = format_iso_date(clamped).map_err(|e| {
            let error = ValidationError::InvalidDate(e.to_string());
            self.error = Some(error.to_string());
            error
        })?;
        if clamped == date {
            return Ok(());
        }

        let error = if date > self.bounds.today() {
            ValidationError::HireDateInFuture
        } else {
            ValidationError::HireDateTooOld
        };
        warn!(%date, %clamped, "hire date outside window, clamped");
        self.error = Some(error.to_string());
        Err(error)
    }

    /// Takes a raw picker value (`YYYY-MM-DD`).
    pub fn pick_hire_date_value(&mut self, value: &str) -> Result<(), ValidationError> {
        let date = parse_iso_date(value.trim()).map_err(|reason| {
            let error = ValidationError::InvalidDate(reason);
            self.error = Some(error.to_string());
            error
        })?;
        self.pick_hire_date(date)
    }

    /// Validates the fields and builds the create request.
    pub fn submit(&mut self) -> Result<FormSubmission, ValidationError> {
        self.error = None;
        let result = self.validate();
        if let Err(error) = &result {
            debug!(%error, "add employee form rejected");
            self.error = Some(error.to_string());
        }
        result
    }

    /// Shows a failure reported by the server after a valid submission.
    pub fn show_error(&mut self, error: &Error) {
        self.error = Some(error.display_message());
    }

    fn validate(&self) -> Result<FormSubmission, ValidationError> {
        let id_text = self.id.trim();
        if id_text.is_empty() {
            return Err(ValidationError::MissingId);
        }
        let id: u64 = id_text.parse().map_err(|_| ValidationError::InvalidId)?;
        if self.roster.iter().any(|e| e.id == id) {
            return Err(ValidationError::IdInUse(id));
        }

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let position = self.position.trim();
        if position.is_empty() {
            return Err(ValidationError::MissingPosition);
        }

        if self.hire_date.trim().is_empty() {
            return Err(ValidationError::MissingHireDate);
        }

        if self.manager_id.trim().is_empty() {
            return Err(ValidationError::MissingManager);
        }

        let unknown: Vec<u64> = self
            .direct_reports
            .iter()
            .copied()
            .filter(|report| !self.roster.iter().any(|e| e.id == *report))
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationError::UnknownDirectReports(unknown));
        }

        let hire_date = iso_to_wire(&self.hire_date).map_err(ValidationError::InvalidDate)?;

        Ok(FormSubmission {
            employee: NewEmployee {
                id,
                name: format!("{first_name} {last_name}"),
                position: position.to_string(),
                hire_date,
                active: true,
                direct_reports: self.direct_reports.clone(),
            },
            manager_id: self.manager_id.trim().parse().ok(),
        })
    }
}
