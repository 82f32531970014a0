//! UI state of the roster and the reducer that evolves it.
//!
//! Every change goes through [`RosterState::reduce`], so a sequence of
//! [`Event`]s fully determines the resulting state and can be replayed.

use tokio::time::Instant;

use crate::date_range::DateRange;
use crate::employee::{Employee, EmployeeDetails};
use crate::notification::{Notification, Severity};

/// Which employees the status filter shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    /// Narrows a full listing to the employees this filter shows.
    #[must_use]
    pub fn apply(self, employees: Vec<Employee>) -> Vec<Employee> {
        match self {
            Self::All => employees,
            Self::Active => employees.into_iter().filter(|e| e.active).collect(),
            Self::Inactive => employees.into_iter().filter(|e| !e.active).collect(),
        }
    }
}

/// Ordering of the roster by last name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The query the roster currently reflects. Exactly one mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterQuery {
    Status(StatusFilter),
    HiredBetween(DateRange),
}

#[derive(Debug, Clone)]
pub enum Event {
    LoggedIn,
    LoggedOut,
    /// Switches to status filtering; any date range is dropped.
    FilterSelected(StatusFilter),
    /// Switches to (or, with `None`, away from) date-range filtering.
    DateRangeSelected(Option<DateRange>),
    RefreshStarted {
        generation: u64,
    },
    RosterLoaded {
        generation: u64,
        employees: Vec<Employee>,
    },
    /// The query was refused before reaching the network.
    RosterRejected {
        generation: u64,
        message: String,
    },
    RosterFailed {
        generation: u64,
        message: String,
    },
    DetailsLoaded(EmployeeDetails),
    DetailsClosed,
    RowBusy(u64),
    RowIdle,
    /// Local flip of an employee's status ahead of the authoritative refetch.
    StatusChanged {
        id: u64,
        active: bool,
    },
    Notified {
        message: String,
        severity: Severity,
        expires_at: Instant,
    },
    NotificationDismissed,
    /// Drops the notification if it has expired by `now`.
    NotificationsExpired {
        now: Instant,
    },
    ErrorRaised(String),
    ErrorDismissed,
    AddFormOpened,
    AddFormClosed,
    Sorted(SortDirection),
}

#[derive(Debug, Clone, Default)]
pub struct RosterState {
    pub logged_in: bool,
    /// The roster as currently displayed.
    pub employees: Vec<Employee>,
    pub loading: bool,
    /// Banner message.
    pub error: Option<String>,
    pub filter: StatusFilter,
    pub date_range: Option<DateRange>,
    pub selected: Option<EmployeeDetails>,
    pub show_add_form: bool,
    /// Employee whose row awaits a status change or deletion.
    pub loading_employee_id: Option<u64>,
    pub notification: Option<Notification>,
    pub sort: Option<SortDirection>,
    generation: u64,
    notification_seq: u64,
}

impl RosterState {
    /// Folds `events` over the initial state.
    #[must_use]
    pub fn replay(events: impl IntoIterator<Item = Event>) -> Self {
        events
            .into_iter()
            .fold(Self::default(), |state, event| state.reduce(event))
    }

    /// The generation of the latest refresh issued.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The generation the next refresh should carry.
    #[must_use]
    pub fn next_generation(&self) -> u64 {
        self.generation + 1
    }

    #[must_use]
    pub fn query(&self) -> RosterQuery {
        match self.date_range {
            Some(range) => RosterQuery::HiredBetween(range),
            None => RosterQuery::Status(self.filter),
        }
    }

    #[must_use]
    pub fn employee(&self, id: u64) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// The notification still visible at `now`, if any.
    #[must_use]
    pub fn visible_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    #[must_use]
    pub fn reduce(mut self, event: Event) -> Self {
        match event {
            Event::LoggedIn => self.logged_in = true,
            Event::LoggedOut => self.logged_in = false,
            Event::FilterSelected(filter) => {
                self.filter = filter;
                self.date_range = None;
            }
            Event::DateRangeSelected(range) => {
                self.date_range = range;
                self.filter = StatusFilter::All;
            }
            Event::RefreshStarted { generation } => {
                if generation > self.generation {
                    self.generation = generation;
                    self.loading = true;
                    self.error = None;
                }
            }
            Event::RosterLoaded {
                generation,
                employees,
            } => {
                if self.is_current(generation) {
                    self.employees = employees;
                    self.apply_sort();
                    self.loading = false;
                    self.error = None;
                }
            }
            Event::RosterRejected {
                generation,
                message,
            } => {
                if self.is_current(generation) {
                    self.employees.clear();
                    self.loading = false;
                    self.error = Some(message);
                }
            }
            Event::RosterFailed {
                generation,
                message,
            } => {
                if self.is_current(generation) {
                    self.loading = false;
                    self.error = Some(message);
                }
            }
            Event::DetailsLoaded(details) => self.selected = Some(details),
            Event::DetailsClosed => self.selected = None,
            Event::RowBusy(id) => self.loading_employee_id = Some(id),
            Event::RowIdle => self.loading_employee_id = None,
            Event::StatusChanged { id, active } => {
                if let Some(employee) = self.employees.iter_mut().find(|e| e.id == id) {
                    employee.active = active;
                }
            }
            Event::Notified {
                message,
                severity,
                expires_at,
            } => {
                self.notification_seq += 1;
                self.notification = Some(Notification {
                    seq: self.notification_seq,
                    message,
                    severity,
                    expires_at,
                });
            }
            Event::NotificationDismissed => self.notification = None,
            Event::NotificationsExpired { now } => {
                if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
                    self.notification = None;
                }
            }
            Event::ErrorRaised(message) => self.error = Some(message),
            Event::ErrorDismissed => self.error = None,
            Event::AddFormOpened => self.show_add_form = true,
            Event::AddFormClosed => self.show_add_form = false,
            Event::Sorted(direction) => {
                self.sort = Some(direction);
                self.apply_sort();
            }
        }
        self
    }

    /// Keeps the displayed roster in the chosen order, if one was chosen.
    fn apply_sort(&mut self) {
        let Some(direction) = self.sort else {
            return;
        };
        self.employees.sort_by(|a, b| {
            let ordering = a
                .last_name()
                .to_lowercase()
                .cmp(&b.last_name().to_lowercase());
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        let current = generation == self.generation;
        if !current {
            trace!(
                generation,
                latest = self.generation,
                "discarding stale roster response"
            );
        }
        current
    }
}
