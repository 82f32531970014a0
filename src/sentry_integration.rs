//! Sentry integration for roster-rs errors.
//!
//! Only available with the `sentry` feature:
//!
//! ```toml
//! [dependencies]
//! roster-rs = { version = "0.1", features = ["sentry"] }
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::{Error, ErrorKind};

const BODY_PREVIEW_LEN: usize = 500;

impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        if let Some(url) = error.url() {
            data.insert("url".to_string(), Value::from(url));
        }
        if let Some(status) = error.status_code() {
            data.insert("status_code".to_string(), Value::from(status.as_u16()));
        }
        if let Some(detail) = error.detail() {
            data.insert("message".to_string(), Value::from(detail));
        }

        let (category, level) = match error.kind() {
            ErrorKind::Transport => ("http.request", sentry_core::Level::Error),
            ErrorKind::Decode | ErrorKind::Server => ("http.response", sentry_core::Level::Error),
            ErrorKind::NotFound | ErrorKind::BadRequest | ErrorKind::Protected => {
                ("roster.api", sentry_core::Level::Warning)
            }
            ErrorKind::Config => ("roster.config", sentry_core::Level::Error),
            ErrorKind::Validation => ("roster.validation", sentry_core::Level::Info),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(error.to_string()),
            data,
            level,
            ..Default::default()
        }
    }
}

/// Extracts the context of `error` as Sentry extras.
///
/// ```ignore
/// use sentry::configure_scope;
/// use roster_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.employees().list_all().await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert(
            "roster.span_trace".to_string(),
            Value::from(format!("{span_trace}")),
        );
    }
    if let Some(url) = error.url() {
        context.insert("roster.url".to_string(), Value::from(url));
    }
    if let Some(status) = error.status_code() {
        context.insert("roster.status_code".to_string(), Value::from(status.as_u16()));
    }
    if let Some(detail) = error.detail() {
        context.insert("roster.message".to_string(), Value::from(detail));
    }
    if let Some(body) = error.response_body() {
        let truncated = match body.char_indices().nth(BODY_PREVIEW_LEN) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        context.insert("roster.response_body".to_string(), Value::from(truncated));
    }

    context
}
