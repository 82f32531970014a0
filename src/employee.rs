//! Employee records as exchanged with the roster API.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::utils::{
    date_format::{iso_date, optional_wire_date},
    serde_helpers::null_as_default,
};

/// A single employee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub position: String,
    /// `None` when the stored record has no readable hire date.
    #[serde(default, with = "optional_wire_date")]
    pub hire_date: Option<Date>,
    pub active: bool,
    /// Ids of the employees reporting to this one.
    #[serde(default, deserialize_with = "null_as_default")]
    pub direct_reports: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<u64>,
    /// Records seeded by the server. The server refuses to delete them.
    #[serde(default)]
    pub original: bool,
}

impl Employee {
    /// The last whitespace-separated word of the name, used for ordering.
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or(&self.name)
    }
}

/// An employee together with the employees that report to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetails {
    pub employee: Employee,
    #[serde(default, deserialize_with = "null_as_default")]
    pub direct_hires: Vec<Employee>,
    /// Set when the details were rebuilt from the loaded roster because the
    /// detail endpoint failed. Direct hires may then be inaccurate.
    #[serde(skip)]
    pub reconstructed: bool,
}

impl EmployeeDetails {
    /// Rebuilds the details of `id` from an already loaded roster.
    ///
    /// Direct hires are the roster entries listed in the employee's
    /// `direct_reports`. Returns `None` when `id` isn't in the roster.
    #[must_use]
    pub fn from_roster(id: u64, roster: &[Employee]) -> Option<Self> {
        let employee = roster.iter().find(|e| e.id == id)?.clone();
        let direct_hires = roster
            .iter()
            .filter(|e| employee.direct_reports.contains(&e.id))
            .cloned()
            .collect();
        Some(Self {
            employee,
            direct_hires,
            reconstructed: true,
        })
    }
}

/// Body of a create request: an employee without its manager, which travels
/// as the `managerId` query parameter instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub id: u64,
    pub name: String,
    pub position: String,
    /// Already in wire form (`MM/DD/YYYY`).
    pub hire_date: String,
    pub active: bool,
    pub direct_reports: Vec<u64>,
}

/// Query parameters of the hire-date search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HireDateQuery {
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<u64>,
}
