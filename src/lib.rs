//! # roster-rs
//!
//! A client for an employee roster HTTP API, together with the state
//! handling of a roster screen built on top of it.
//!
//! [`Client`] talks to `/api/employees`. [`App`] drives a [`RosterState`]
//! through a reducer: every user intent becomes API calls followed by
//! [`state::Event`]s, and roster refreshes carry a generation number so a
//! slow, superseded response can never overwrite a newer one.
//!
//! ```ignore
//! use roster_rs::{App, Config, StatusFilter};
//!
//! let mut app = App::new(Config::from_env()?)?;
//! app.login().await;
//! app.select_filter(StatusFilter::Inactive).await;
//! for employee in &app.state().employees {
//!     println!("{} ({})", employee.name, employee.position);
//! }
//! ```
//!
//! ## Sentry Integration
//!
//! Errors capture a [`SpanTrace`] where they are created. With the `sentry`
//! feature enabled, [`Error`] converts into a Sentry breadcrumb and
//! `sentry_integration::error_to_sentry_context` extracts extra context.
//! Span traces are only populated when the subscriber has an
//! `ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod app;
pub mod client;
pub mod config;
pub mod date_range;
pub mod employee;
pub mod endpoints;
pub mod error;
pub mod form;
pub mod notification;
pub mod state;
pub mod toolbar;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use app::{App, Confirm, RefreshTicket};
pub use client::Client;
pub use config::Config;
pub use date_range::{DateBounds, DateRange, DateRangeFilter};
pub use employee::{Employee, EmployeeDetails, NewEmployee};
pub use endpoints::EmployeeEndpoint;
pub use error::{Error, ErrorKind, ValidationError};
pub use form::{AddEmployeeForm, FormSubmission};
pub use notification::{Notification, Severity};
pub use state::{Event, RosterQuery, RosterState, SortDirection, StatusFilter};
pub use toolbar::{SortToggle, StatusAction};

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
