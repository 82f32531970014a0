use std::fmt;
use url::Url;

use crate::error::{Error, Result};

/// Path of the employee resource, relative to the configured base URL.
pub const BASE_PATH: &str = "api/employees";

/// A typed representation of the roster API endpoints.
///
/// Endpoints are relative; [`EmployeeEndpoint::to_url`] resolves them
/// against the base URL the client was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeEndpoint {
    /// The collection itself. `GET` lists active employees, `POST` creates.
    Employees,
    /// Every employee regardless of status.
    All,
    /// A single employee together with its direct hires.
    Employee(u64),
    /// Employees hired within a date range, filtered by query parameters.
    Hired,
    Deactivate(u64),
    Reactivate(u64),
}

impl EmployeeEndpoint {
    /// The endpoint path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Employees => BASE_PATH.to_string(),
            Self::All => format!("{BASE_PATH}/all"),
            Self::Employee(id) => format!("{BASE_PATH}/{id}"),
            Self::Hired => format!("{BASE_PATH}/hired"),
            Self::Deactivate(id) => format!("{BASE_PATH}/{id}/deactivate"),
            Self::Reactivate(id) => format!("{BASE_PATH}/{id}/reactivate"),
        }
    }

    /// Resolves the endpoint against `base`.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint);
        }
        base.join(&self.path()).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for EmployeeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Makes sure `base` ends with a slash so that joining keeps its last path segment.
#[must_use]
pub fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
