//! The application shell.
//!
//! [`App`] owns the API client and the [`RosterState`]. Each public method
//! handles one user intent: it calls the API, turns the outcome into
//! [`Event`]s and feeds them to the reducer. Failures are caught here and
//! turned into banner or notification text; only creation hands errors back
//! to the caller, so the form can show them.

use tokio::time::Instant;

use crate::client::Client;
use crate::config::Config;
use crate::date_range::DateRange;
use crate::employee::{Employee, EmployeeDetails};
use crate::error::{Error, ErrorKind, PROTECTED_EMPLOYEE_MESSAGE, Result, ValidationError};
use crate::form::{AddEmployeeForm, FormSubmission};
use crate::notification::Severity;
use crate::state::{Event, RosterQuery, RosterState, SortDirection, StatusFilter};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this employee?";
pub const LOCAL_DETAILS_WARNING: &str =
    "Using local data due to backend limitations. Direct reports may not be accurate.";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A roster refresh in flight: the generation it was issued under and the
/// query it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub query: RosterQuery,
}

#[derive(Debug)]
pub struct App {
    client: Client,
    config: Config,
    state: RosterState,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::from_config(&config)?;
        Ok(Self::with_client(client, config))
    }

    #[must_use]
    pub fn with_client(client: Client, config: Config) -> Self {
        Self {
            client,
            config,
            state: RosterState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RosterState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn dispatch(&mut self, event: Event) {
        trace!(?event, "dispatching");
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        debug!(%message, ?severity, "notification");
        self.dispatch(Event::Notified {
            message,
            severity,
            expires_at: Instant::now() + self.config.notification_ttl,
        });
    }

    /// Passes the login gate and loads the roster.
    #[instrument(skip(self))]
    pub async fn login(&mut self) {
        self.dispatch(Event::LoggedIn);
        self.refresh().await;
    }

    pub fn logout(&mut self) {
        self.dispatch(Event::LoggedOut);
    }

    /// Switches to status filtering and reloads.
    #[instrument(skip(self))]
    pub async fn select_filter(&mut self, filter: StatusFilter) {
        self.dispatch(Event::FilterSelected(filter));
        self.refresh().await;
    }

    /// Switches to hire-date filtering (or back, with `None`) and reloads.
    #[instrument(skip(self))]
    pub async fn apply_date_range(&mut self, range: Option<DateRange>) {
        self.dispatch(Event::DateRangeSelected(range));
        self.refresh().await;
    }

    /// Issues a new refresh generation for the current query.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        let ticket = RefreshTicket {
            generation: self.state.next_generation(),
            query: self.state.query(),
        };
        self.dispatch(Event::RefreshStarted {
            generation: ticket.generation,
        });
        ticket
    }

    /// Runs the query of `ticket`. A date range that fails validation is
    /// refused here, without a request.
    #[instrument(skip(self))]
    pub async fn fetch_roster(&self, ticket: RefreshTicket) -> Result<Vec<Employee>> {
        let employees = self.client.employees();
        match ticket.query {
            RosterQuery::HiredBetween(range) => {
                self.config.bounds.check_range(&range)?;
                employees.list_hired(range).await
            }
            RosterQuery::Status(StatusFilter::Active) => employees.list_active().await,
            RosterQuery::Status(filter) => Ok(filter.apply(employees.list_all().await?)),
        }
    }

    /// Applies the outcome of a refresh. Outcomes of superseded generations
    /// are dropped by the reducer.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, result: Result<Vec<Employee>>) {
        let generation = ticket.generation;
        let event = match result {
            Ok(employees) => {
                debug!(generation, count = employees.len(), "roster loaded");
                Event::RosterLoaded {
                    generation,
                    employees,
                }
            }
            Err(Error::Validation(rejection)) => {
                debug!(generation, %rejection, "roster query refused");
                Event::RosterRejected {
                    generation,
                    message: rejection.to_string(),
                }
            }
            Err(error)
                if error.kind() == ErrorKind::BadRequest
                    && matches!(ticket.query, RosterQuery::HiredBetween(_)) =>
            {
                debug!(generation, "hire date query answered 400, showing no results");
                Event::RosterLoaded {
                    generation,
                    employees: Vec::new(),
                }
            }
            Err(error) => {
                error!(generation, ?error, "Error fetching employees");
                Event::RosterFailed {
                    generation,
                    message: format!("Failed to load employees. {}", error.display_message()),
                }
            }
        };
        self.dispatch(event);
    }

    /// Reloads the roster for the current query.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) {
        let ticket = self.begin_refresh();
        let result = self.fetch_roster(ticket).await;
        self.complete_refresh(ticket, result);
    }

    /// Opens the details of `id`, rebuilding them from the roster when the
    /// detail endpoint fails.
    #[instrument(skip(self))]
    pub async fn view_details(&mut self, id: u64) {
        match self.client.employees().get(id).await {
            Ok(details) => self.dispatch(Event::DetailsLoaded(details)),
            Err(error) => {
                warn!(?error, "Error fetching employee details");
                match EmployeeDetails::from_roster(id, &self.state.employees) {
                    Some(details) => {
                        self.dispatch(Event::DetailsLoaded(details));
                        self.notify(LOCAL_DETAILS_WARNING, Severity::Warning);
                    }
                    None => self.dispatch(Event::ErrorRaised(format!(
                        "Failed to load employee details: {}",
                        error.display_message()
                    ))),
                }
            }
        }
    }

    pub fn close_details(&mut self) {
        self.dispatch(Event::DetailsClosed);
    }

    /// Activates an inactive employee or deactivates an active one.
    ///
    /// On success the local row flips at once, the open details are reloaded
    /// if they show this employee, and the roster is refetched.
    #[instrument(skip(self))]
    pub async fn toggle_status(&mut self, id: u64, currently_active: bool) -> Result<()> {
        self.dispatch(Event::RowBusy(id));

        let employees = self.client.employees();
        let result = if currently_active {
            employees.deactivate(id).await
        } else {
            employees.activate(id).await
        };

        let outcome = match result {
            Ok(_) => {
                self.dispatch(Event::StatusChanged {
                    id,
                    active: !currently_active,
                });
                let verb = if currently_active { "deactivated" } else { "activated" };
                info!(id, verb, "employee status changed");
                self.notify(format!("Employee {verb} successfully"), Severity::Success);

                if self
                    .state
                    .selected
                    .as_ref()
                    .is_some_and(|details| details.employee.id == id)
                {
                    self.view_details(id).await;
                }

                self.refresh().await;
                Ok(())
            }
            Err(error) => {
                error!(?error, "Error changing employee status");
                self.notify(error.display_message(), Severity::Error);
                Err(error)
            }
        };

        self.dispatch(Event::RowIdle);
        outcome
    }

    /// Deletes `id` once `confirm` agrees. Returns whether a delete was attempted.
    #[instrument(skip(self, confirm))]
    pub async fn delete_employee(&mut self, id: u64, confirm: &mut impl Confirm) -> Result<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            info!(id, "delete cancelled by user");
            return Ok(false);
        }

        self.dispatch(Event::RowBusy(id));
        let outcome = match self.client.employees().delete(id).await {
            Ok(()) => {
                info!(id, "employee deleted");
                self.refresh().await;
                self.notify("Employee deleted successfully", Severity::Success);
                Ok(true)
            }
            Err(error) => {
                error!(?error, "Error deleting employee");
                if error.kind() == ErrorKind::Protected {
                    self.notify(PROTECTED_EMPLOYEE_MESSAGE, Severity::Error);
                } else {
                    self.notify(
                        format!("Failed to delete employee: {}", error.display_message()),
                        Severity::Error,
                    );
                }
                Err(error)
            }
        };
        self.dispatch(Event::RowIdle);
        outcome
    }

    /// Creates an employee after checking its id and direct reports against
    /// a freshly fetched roster.
    ///
    /// Pre-check failures raise an error notification and no create call is
    /// made. Server failures are returned untouched for the form to show.
    #[instrument(skip(self, submission), fields(id = submission.employee.id))]
    pub async fn create_employee(&mut self, submission: FormSubmission) -> Result<Employee> {
        let roster = self.client.employees().list_all().await.inspect_err(|error| {
            error!(?error, "Error adding employee");
        })?;

        let employee = &submission.employee;
        if roster.iter().any(|e| e.id == employee.id) {
            return Err(self.reject(ValidationError::IdExists(employee.id)));
        }

        let unknown: Vec<u64> = employee
            .direct_reports
            .iter()
            .copied()
            .filter(|report| !roster.iter().any(|e| e.id == *report))
            .collect();
        if !unknown.is_empty() {
            return Err(self.reject(ValidationError::UnknownDirectReports(unknown)));
        }

        let created = self
            .client
            .employees()
            .create(employee, submission.manager_id)
            .await
            .inspect_err(|error| error!(?error, "Error adding employee"))?;

        self.dispatch(Event::AddFormClosed);
        self.refresh().await;
        self.notify(
            format!("Employee {} added successfully", created.name),
            Severity::Success,
        );
        Ok(created)
    }

    fn reject(&mut self, rejection: ValidationError) -> Error {
        self.notify(rejection.to_string(), Severity::Error);
        Error::Validation(rejection)
    }

    /// Opens the add form, checked against the roster currently shown.
    pub fn open_add_form(&mut self) -> AddEmployeeForm {
        self.dispatch(Event::AddFormOpened);
        AddEmployeeForm::new(self.config.bounds, self.state.employees.clone())
    }

    pub fn close_add_form(&mut self) {
        self.dispatch(Event::AddFormClosed);
    }

    /// Submits the form. Any failure is also left on the form for display.
    #[instrument(skip(self, form))]
    pub async fn submit_add_form(&mut self, form: &mut AddEmployeeForm) -> Result<Employee> {
        let submission = form.submit()?;
        self.create_employee(submission).await.inspect_err(|error| {
            if !error.is_validation() {
                form.show_error(error);
            }
        })
    }

    pub fn sort(&mut self, direction: SortDirection) {
        self.dispatch(Event::Sorted(direction));
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Event::ErrorDismissed);
    }

    pub fn dismiss_notification(&mut self) {
        self.dispatch(Event::NotificationDismissed);
    }

    /// Drops the notification if its display time is over.
    pub fn expire_notifications(&mut self) {
        self.dispatch(Event::NotificationsExpired {
            now: Instant::now(),
        });
    }

    /// Surfaces a toolbar rejection the way the toolbar shows it.
    pub fn report_rejection(&mut self, rejection: &ValidationError) {
        let severity = if rejection.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.notify(rejection.to_string(), severity);
    }
}
