use std::fmt;

use miette::Diagnostic;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing_error::SpanTrace;

/// Message the roster API returns when asked to delete a protected record.
pub const PROTECTED_EMPLOYEE_MESSAGE: &str = "Cannot delete original employees";

/// Body returned by the roster API alongside a non-2xx status.
///
/// Every field is optional: the API may answer with an empty body, with a
/// bare status, or with `{ "message": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Parses an error body, falling back to an empty response when the body
    /// isn't the expected JSON shape.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{message}"),
            None => write!(f, "no message supplied"),
        }
    }
}

/// Coarse classification of an [`Error`], used by the shell to decide how a
/// failure is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected on the client before any request was made.
    Validation,
    /// The server answered 400.
    BadRequest,
    /// The server answered 404.
    NotFound,
    /// The server refused to delete a protected record.
    Protected,
    /// Any other non-2xx answer.
    Server,
    /// The request never produced a response.
    Transport,
    /// A 2xx response whose body could not be decoded.
    Decode,
    /// Invalid local configuration or endpoint.
    Config,
}

/// Client-side validation failures. These never reach the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Cannot search with future dates")]
    #[diagnostic(code(roster_rs::validation::future_range))]
    FutureRange,

    #[error("Dates cannot be more than 100 years in the past")]
    #[diagnostic(code(roster_rs::validation::range_too_old))]
    RangeTooOld,

    #[error("Start date must be before or equal to end date")]
    #[diagnostic(code(roster_rs::validation::range_inverted))]
    RangeInverted,

    #[error("Selected date cannot be in the future")]
    #[diagnostic(code(roster_rs::validation::date_in_future))]
    DateInFuture,

    #[error("Date cannot be more than 100 years in the past")]
    #[diagnostic(code(roster_rs::validation::date_too_old))]
    DateTooOld,

    #[error("Both start and end dates are required")]
    #[diagnostic(code(roster_rs::validation::missing_dates))]
    MissingDates,

    #[error("Selected dates cannot be in the future")]
    #[diagnostic(code(roster_rs::validation::dates_in_future))]
    DatesInFuture,

    #[error("End date must be after start date")]
    #[diagnostic(code(roster_rs::validation::end_before_start))]
    EndBeforeStart,

    #[error("Employee ID is required")]
    #[diagnostic(code(roster_rs::validation::missing_id))]
    MissingId,

    #[error("Employee ID must be a valid number")]
    #[diagnostic(code(roster_rs::validation::invalid_id))]
    InvalidId,

    #[error("Employee ID {0} is already in use. Please choose a different ID.")]
    #[diagnostic(
        code(roster_rs::validation::id_in_use),
        help("Pick an ID that no listed employee already has")
    )]
    IdInUse(u64),

    #[error("Employee ID {0} already exists")]
    #[diagnostic(code(roster_rs::validation::id_exists))]
    IdExists(u64),

    #[error("Both first and last names are required")]
    #[diagnostic(code(roster_rs::validation::missing_name))]
    MissingName,

    #[error("Position is required")]
    #[diagnostic(code(roster_rs::validation::missing_position))]
    MissingPosition,

    #[error("Hire date is required")]
    #[diagnostic(code(roster_rs::validation::missing_hire_date))]
    MissingHireDate,

    #[error("Hire date cannot be in the future")]
    #[diagnostic(code(roster_rs::validation::hire_date_in_future))]
    HireDateInFuture,

    #[error("Hire date cannot be more than 100 years in the past")]
    #[diagnostic(code(roster_rs::validation::hire_date_too_old))]
    HireDateTooOld,

    #[error("Invalid date: {0}")]
    #[diagnostic(
        code(roster_rs::validation::invalid_date),
        help("Dates are picked as YYYY-MM-DD")
    )]
    InvalidDate(String),

    #[error("Manager is required")]
    #[diagnostic(code(roster_rs::validation::missing_manager))]
    MissingManager,

    #[error("The following direct report IDs do not exist: {}", join_ids(.0))]
    #[diagnostic(code(roster_rs::validation::unknown_direct_reports))]
    UnknownDirectReports(Vec<u64>),

    #[error("Please enter an employee ID")]
    #[diagnostic(code(roster_rs::validation::missing_lookup_id))]
    MissingLookupId,

    #[error("Employee not found")]
    #[diagnostic(code(roster_rs::validation::employee_not_found))]
    EmployeeNotFound,

    #[error("Employee is already active")]
    #[diagnostic(code(roster_rs::validation::already_active))]
    AlreadyActive,

    #[error("Employee is already inactive")]
    #[diagnostic(code(roster_rs::validation::already_inactive))]
    AlreadyInactive,
}

impl ValidationError {
    /// Rejections that only tell the user the action is a no-op.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::AlreadyActive | Self::AlreadyInactive)
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur when interacting with the roster API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {source}")]
    #[diagnostic(
        code(roster_rs::request_error),
        help("Check your network connection and that the roster API is reachable")
    )]
    Request {
        #[source]
        source: reqwest::Error,
        span_trace: SpanTrace,
    },

    #[error("error decoding response from {url}: {source}")]
    #[diagnostic(
        code(roster_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError {
        #[source]
        source: serde_json::Error,
        url: String,
        response_body: Option<String>,
        span_trace: SpanTrace,
    },

    #[error("employee not found (url: {url}): {response}")]
    #[diagnostic(
        code(roster_rs::not_found),
        help("Verify that the employee exists")
    )]
    NotFound {
        url: String,
        response: ErrorResponse,
        span_trace: SpanTrace,
    },

    /// A non-2xx answer other than 404, carrying whatever message the server sent.
    #[error("api error {status_code} (url: {url}): {response}")]
    #[diagnostic(
        code(roster_rs::api_error),
        help("Review the message returned by the roster API")
    )]
    API {
        url: String,
        status_code: StatusCode,
        response: ErrorResponse,
        span_trace: SpanTrace,
    },

    /// The server refused to delete one of its original records.
    #[error("Cannot delete original employees (url: {url})")]
    #[diagnostic(
        code(roster_rs::protected_employee),
        help("Original employees can be deactivated but never deleted")
    )]
    Protected {
        url: String,
        status_code: StatusCode,
        response: ErrorResponse,
        span_trace: SpanTrace,
    },

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(roster_rs::invalid_endpoint),
        help("Check that the configured base URL is an absolute http(s) URL")
    )]
    InvalidEndpoint,

    #[error("invalid configuration value for {variable}: {value:?}")]
    #[diagnostic(
        code(roster_rs::config),
        help("ROSTER_API_URL must be a URL, ROSTER_TODAY a YYYY-MM-DD date and ROSTER_NOTIFICATION_SECS a whole number")
    )]
    Config { variable: String, value: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Request {
            source,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl Error {
    /// Builds the error for a non-2xx response, classifying it by status and message.
    pub(crate) fn from_status(url: String, status_code: StatusCode, body: &str) -> Self {
        let response = ErrorResponse::from_body(body);
        let span_trace = SpanTrace::capture();

        if response
            .message
            .as_deref()
            .is_some_and(|message| message.contains(PROTECTED_EMPLOYEE_MESSAGE))
        {
            return Self::Protected {
                url,
                status_code,
                response,
                span_trace,
            };
        }

        match status_code {
            StatusCode::NOT_FOUND => Self::NotFound {
                url,
                response,
                span_trace,
            },
            status_code => Self::API {
                url,
                status_code,
                response,
                span_trace,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request { .. } => ErrorKind::Transport,
            Self::DeserializationError { .. } => ErrorKind::Decode,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::API { status_code, .. } if *status_code == StatusCode::BAD_REQUEST => {
                ErrorKind::BadRequest
            }
            Self::API { .. } => ErrorKind::Server,
            Self::Protected { .. } => ErrorKind::Protected,
            Self::InvalidEndpoint | Self::Config { .. } => ErrorKind::Config,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The message supplied by the server, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound { response, .. }
            | Self::API { response, .. }
            | Self::Protected { response, .. } => response.message.as_deref(),
            _ => None,
        }
    }

    /// The text shown to the user: the server's message verbatim when there is
    /// one, a generic description of the failure otherwise.
    #[must_use]
    pub fn display_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        match self {
            Self::NotFound { .. } => "Request failed with status code 404".to_string(),
            Self::API { status_code, .. } | Self::Protected { status_code, .. } => {
                format!("Request failed with status code {}", status_code.as_u16())
            }
            Self::Request { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::Request { span_trace, .. }
            | Self::DeserializationError { span_trace, .. }
            | Self::NotFound { span_trace, .. }
            | Self::API { span_trace, .. }
            | Self::Protected { span_trace, .. } => Some(span_trace),
            _ => None,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::DeserializationError { url, .. }
            | Self::NotFound { url, .. }
            | Self::API { url, .. }
            | Self::Protected { url, .. } => Some(url),
            Self::Request { source, .. } => source.url().map(url::Url::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::API { status_code, .. } | Self::Protected { status_code, .. } => {
                Some(*status_code)
            }
            Self::Request { source, .. } => source.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::DeserializationError { response_body, .. } => response_body.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Type alias for results from this crate.
pub type Result<O> = std::result::Result<O, Error>;
