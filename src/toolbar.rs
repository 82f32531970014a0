//! Resolution of the ids typed into the operation toolbar.

use crate::employee::Employee;
use crate::error::ValidationError;
use crate::state::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Activate,
    Deactivate,
}

/// Parses a typed employee id.
pub fn parse_id(input: &str) -> Result<u64, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::MissingLookupId);
    }
    input.parse().map_err(|_| ValidationError::EmployeeNotFound)
}

/// Looks up the employee a status change targets and checks the change
/// isn't a no-op. Returns the employee's id and its current status.
pub fn resolve_status_change(
    input: &str,
    action: StatusAction,
    roster: &[Employee],
) -> Result<(u64, bool), ValidationError> {
    let id = parse_id(input)?;
    let employee = roster
        .iter()
        .find(|e| e.id == id)
        .ok_or(ValidationError::EmployeeNotFound)?;

    match (action, employee.active) {
        (StatusAction::Activate, true) => Err(ValidationError::AlreadyActive),
        (StatusAction::Deactivate, false) => Err(ValidationError::AlreadyInactive),
        (_, active) => Ok((id, active)),
    }
}

/// The sort toggle: first press sorts A to Z, then alternates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortToggle {
    next: SortDirection,
}

impl SortToggle {
    /// Returns the direction to apply now and flips for the next press.
    pub fn press(&mut self) -> SortDirection {
        let direction = self.next;
        self.next = direction.toggled();
        direction
    }
}
