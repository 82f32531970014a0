
use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use time::macros::date;

use roster_rs::{
    App, Config, DateRange, Error, NewEmployee, Severity, SortDirection, StatusAction,
    StatusFilter, ValidationError, app::LOCAL_DETAILS_WARNING, form::FormSubmission,
    toolbar::resolve_status_change,
};
use test_utils::{MockServer, do_setup, mock_employee, seed_roster};

fn ids(app: &App) -> Vec<u64> {
    app.state().employees.iter().map(|e| e.id).collect()
}

fn notification(app: &App) -> Option<(String, Severity)> {
    app.state()
        .notification
        .as_ref()
        .map(|n| (n.message.clone(), n.severity))
}

fn submission(id: u64, direct_reports: Vec<u64>) -> FormSubmission {
    FormSubmission {
        employee: NewEmployee {
            id,
            name: "Mary Jackson".to_string(),
            position: "Engineer".to_string(),
            hire_date: "02/03/2024".to_string(),
            active: true,
            direct_reports,
        },
        manager_id: Some(1),
    }
}

#[tokio::test]
async fn login_loads_everyone() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    app.login().await;
    assert!(app.state().logged_in);
    assert!(!app.state().loading);
    assert_eq!(ids(&app), vec![1, 2, 3, 4]);
    assert_eq!(server.requests(), vec!["GET /api/employees/all"]);

    app.logout();
    assert!(!app.state().logged_in);
    Ok(())
}

#[tokio::test]
async fn inactive_filter_with_only_active_staff_is_empty() -> Result<()> {
    do_setup();
    let server = MockServer::start(vec![
        mock_employee(1, "Ada Lovelace", "12/10/2015", true),
        mock_employee(2, "Alan Turing", "06/23/2012", true),
    ])
    .await?;
    let mut app = server.app()?;

    app.select_filter(StatusFilter::Inactive).await;
    assert!(app.state().employees.is_empty());
    assert!(app.state().error.is_none());
    assert_eq!(server.requests(), vec!["GET /api/employees/all"]);
    Ok(())
}

#[tokio::test]
async fn active_filter_uses_active_endpoint() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    app.select_filter(StatusFilter::Active).await;
    assert_eq!(ids(&app), vec![1, 2, 4]);
    assert_eq!(server.requests(), vec!["GET /api/employees"]);
    Ok(())
}

#[tokio::test]
async fn inverted_range_is_refused_without_a_request() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.clear_requests();

    let inverted = DateRange::new(date!(2025 - 04 - 13), date!(2025 - 04 - 10));
    app.apply_date_range(Some(inverted)).await;

    assert_eq!(
        app.state().error.as_deref(),
        Some("Start date must be before or equal to end date")
    );
    assert!(app.state().employees.is_empty());
    assert!(!app.state().loading);
    assert!(server.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn future_range_is_refused_without_a_request() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    let future = DateRange::new(date!(2025 - 04 - 01), date!(2025 - 05 - 01));
    app.apply_date_range(Some(future)).await;

    assert_eq!(
        app.state().error.as_deref(),
        Some("Cannot search with future dates")
    );
    assert!(server.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn filter_and_range_replace_each_other() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    app.select_filter(StatusFilter::Active).await;
    let range = DateRange::new(date!(2025 - 04 - 10), date!(2025 - 04 - 13));
    app.apply_date_range(Some(range)).await;
    assert_eq!(app.state().filter, StatusFilter::All);
    assert_eq!(app.state().date_range, Some(range));
    assert_eq!(ids(&app), vec![4]);

    app.select_filter(StatusFilter::Inactive).await;
    assert_eq!(app.state().date_range, None);
    assert_eq!(ids(&app), vec![3]);

    assert_eq!(
        server.requests(),
        vec![
            "GET /api/employees",
            "GET /api/employees/hired?startDate=2025-04-10&endDate=2025-04-13",
            "GET /api/employees/all",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn clearing_range_returns_to_status_filtering() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    let range = DateRange::new(date!(2025 - 04 - 10), date!(2025 - 04 - 13));
    app.apply_date_range(Some(range)).await;
    assert_eq!(ids(&app), vec![4]);
    server.clear_requests();

    app.apply_date_range(None).await;
    assert_eq!(app.state().date_range, None);
    assert_eq!(app.state().filter, StatusFilter::All);
    assert_eq!(ids(&app), vec![1, 2, 3, 4]);
    assert_eq!(server.requests(), vec!["GET /api/employees/all"]);
    Ok(())
}

#[tokio::test]
async fn rejected_range_search_shows_no_results() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.state().hired_rejected = true;

    let range = DateRange::new(date!(2020 - 01 - 01), date!(2021 - 01 - 01));
    app.apply_date_range(Some(range)).await;
    assert!(app.state().employees.is_empty());
    assert!(app.state().error.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_roster_and_shows_banner() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    server.state().listing_unavailable = true;
    app.refresh().await;
    assert_eq!(
        app.state().error.as_deref(),
        Some("Failed to load employees. Database unavailable")
    );
    assert_eq!(ids(&app), vec![1, 2, 3, 4]);

    app.dismiss_error();
    assert!(app.state().error.is_none());
    Ok(())
}

#[tokio::test]
async fn stale_refresh_never_overwrites_newer_one() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    let first = app.begin_refresh();
    let second = app.begin_refresh();
    assert!(second.generation > first.generation);

    let older = app.fetch_roster(first).await;
    server.state().employees.retain(|e| e.id != 4);
    let newer = app.fetch_roster(second).await;

    // the newer answer lands first, the older one straggles in after it
    app.complete_refresh(second, newer);
    app.complete_refresh(first, older);

    assert_eq!(ids(&app), vec![1, 2, 3]);
    assert!(!app.state().loading);
    Ok(())
}

#[tokio::test]
async fn duplicate_id_is_refused_before_create() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    let error = app.create_employee(submission(2, Vec::new())).await.unwrap_err();
    assert!(matches!(
        error,
        Error::Validation(ValidationError::IdExists(2))
    ));
    assert_eq!(
        notification(&app),
        Some(("Employee ID 2 already exists".to_string(), Severity::Error))
    );
    assert_eq!(server.requests(), vec!["GET /api/employees/all"]);
    Ok(())
}

#[tokio::test]
async fn unknown_direct_reports_are_named() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;

    let error = app
        .create_employee(submission(20, vec![2, 40, 41]))
        .await
        .unwrap_err();
    assert!(error.is_validation());
    assert_eq!(
        notification(&app).map(|(message, _)| message).as_deref(),
        Some("The following direct report IDs do not exist: 40, 41")
    );
    assert!(server.employee(20).is_none());
    assert!(!server.requests().iter().any(|r| r.starts_with("POST")));
    Ok(())
}

#[tokio::test]
async fn create_closes_form_and_refreshes() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    let mut form = app.open_add_form();
    assert!(app.state().show_add_form);
    form.set_id("21");
    form.set_first_name("Mary");
    form.set_last_name("Jackson");
    form.set_position("Engineer");
    form.pick_hire_date(date!(2024 - 02 - 03)).into_diagnostic()?;
    form.set_manager(Some(1));
    form.set_direct_reports(vec![4]);

    let created = app.submit_add_form(&mut form).await.into_diagnostic()?;
    assert_eq!(created.id, 21);
    assert!(!app.state().show_add_form);
    assert!(ids(&app).contains(&21));
    assert_eq!(
        notification(&app),
        Some((
            "Employee Mary Jackson added successfully".to_string(),
            Severity::Success
        ))
    );
    assert_eq!(server.employee(1).unwrap().direct_reports, vec![2, 3, 21]);
    assert_eq!(server.employee(21).unwrap().hire_date, "02/03/2024");
    Ok(())
}

#[tokio::test]
async fn server_refusal_is_left_on_the_form() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    let mut form = app.open_add_form();
    form.set_id("22");
    form.set_first_name("Mary");
    form.set_last_name("Jackson");
    form.set_position("Engineer");
    form.pick_hire_date(date!(2024 - 02 - 03)).into_diagnostic()?;
    form.set_manager(Some(77));

    let error = app.submit_add_form(&mut form).await.unwrap_err();
    assert!(!error.is_validation());
    assert_eq!(form.error(), Some("Employee not found with id: 77"));
    assert!(app.state().show_add_form);
    assert!(app.state().notification.is_none());
    Ok(())
}

#[tokio::test]
async fn deactivate_flips_row_and_refreshes() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.clear_requests();

    let (id, active) =
        resolve_status_change("2", StatusAction::Deactivate, &app.state().employees)
            .into_diagnostic()?;
    app.toggle_status(id, active).await.into_diagnostic()?;

    assert!(!app.state().employee(2).unwrap().active);
    assert_eq!(app.state().loading_employee_id, None);
    assert_eq!(
        notification(&app),
        Some((
            "Employee deactivated successfully".to_string(),
            Severity::Success
        ))
    );
    assert_eq!(
        server.requests(),
        vec!["PUT /api/employees/2/deactivate", "GET /api/employees/all"]
    );
    Ok(())
}

#[tokio::test]
async fn activate_reloads_open_details() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    app.view_details(3).await;
    assert!(!app.state().selected.as_ref().unwrap().employee.active);
    server.clear_requests();

    app.toggle_status(3, false).await.into_diagnostic()?;
    assert!(app.state().selected.as_ref().unwrap().employee.active);
    assert!(app.state().employee(3).unwrap().active);
    assert_eq!(
        server.requests(),
        vec![
            "PUT /api/employees/3/reactivate",
            "GET /api/employees/3",
            "GET /api/employees/all",
        ]
    );

    app.close_details();
    assert!(app.state().selected.is_none());
    Ok(())
}

#[tokio::test]
async fn failed_status_change_notifies_server_message() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    let error = app.toggle_status(99, true).await.unwrap_err();
    assert_eq!(error.display_message(), "Employee not found with id: 99");
    assert_eq!(
        notification(&app),
        Some(("Employee not found with id: 99".to_string(), Severity::Error))
    );
    assert_eq!(app.state().loading_employee_id, None);
    Ok(())
}

#[tokio::test]
async fn original_employee_cannot_be_deleted() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    let mut prompts = Vec::new();
    let mut confirm = |prompt: &str| {
        prompts.push(prompt.to_string());
        true
    };
    let error = app.delete_employee(1, &mut confirm).await.unwrap_err();
    assert_eq!(prompts, vec!["Are you sure you want to delete this employee?"]);
    assert_eq!(error.kind(), roster_rs::ErrorKind::Protected);
    assert_eq!(
        notification(&app),
        Some(("Cannot delete original employees".to_string(), Severity::Error))
    );
    assert_eq!(ids(&app), vec![1, 2, 3, 4]);
    assert_eq!(app.state().loading_employee_id, None);
    Ok(())
}

#[tokio::test]
async fn delete_needs_confirmation() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.clear_requests();

    let attempted = app
        .delete_employee(4, &mut |_: &str| false)
        .await
        .into_diagnostic()?;
    assert!(!attempted);
    assert!(server.requests().is_empty());

    let attempted = app
        .delete_employee(4, &mut |_: &str| true)
        .await
        .into_diagnostic()?;
    assert!(attempted);
    assert_eq!(ids(&app), vec![1, 2, 3]);
    assert_eq!(
        notification(&app),
        Some(("Employee deleted successfully".to_string(), Severity::Success))
    );
    Ok(())
}

#[tokio::test]
async fn details_fall_back_to_loaded_roster() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.state().details_unavailable = true;

    app.view_details(1).await;
    let details = app.state().selected.clone().unwrap();
    assert!(details.reconstructed);
    assert_eq!(details.employee.name, "John Smith");
    let hires: Vec<u64> = details.direct_hires.iter().map(|e| e.id).collect();
    assert_eq!(hires, vec![2, 3]);
    assert_eq!(
        notification(&app),
        Some((LOCAL_DETAILS_WARNING.to_string(), Severity::Warning))
    );
    Ok(())
}

#[tokio::test]
async fn details_of_unknown_employee_raise_banner() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;
    server.state().details_unavailable = true;

    app.view_details(50).await;
    assert!(app.state().selected.is_none());
    assert_eq!(
        app.state().error.as_deref(),
        Some("Failed to load employee details: Internal server error")
    );
    Ok(())
}

#[tokio::test]
async fn sort_orders_by_last_name() -> Result<()> {
    do_setup();
    let server = MockServer::start(seed_roster()).await?;
    let mut app = server.app()?;
    app.login().await;

    let mut toggle = roster_rs::SortToggle::default();
    app.sort(toggle.press());
    // Brown, Doe, Johnson, Smith
    assert_eq!(ids(&app), vec![4, 2, 3, 1]);
    app.sort(toggle.press());
    assert_eq!(ids(&app), vec![1, 3, 2, 4]);
    assert_eq!(app.state().sort, Some(SortDirection::Descending));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn older_expiry_does_not_hide_newer_notification() {
    do_setup();
    let mut app = App::new(Config::from_lookup(|_| None).unwrap()).unwrap();

    app.report_rejection(&ValidationError::AlreadyActive);
    assert_eq!(
        notification(&app),
        Some(("Employee is already active".to_string(), Severity::Warning))
    );

    tokio::time::advance(Duration::from_secs(3)).await;
    app.report_rejection(&ValidationError::EmployeeNotFound);

    // the first message's five seconds are up
    tokio::time::advance(Duration::from_secs(3)).await;
    app.expire_notifications();
    assert_eq!(
        notification(&app),
        Some(("Employee not found".to_string(), Severity::Error))
    );

    tokio::time::advance(Duration::from_secs(2)).await;
    app.expire_notifications();
    assert!(app.state().notification.is_none());
}

#[tokio::test(start_paused = true)]
async fn dismissing_clears_notification() {
    do_setup();
    let mut app = App::new(Config::from_lookup(|_| None).unwrap()).unwrap();
    app.report_rejection(&ValidationError::AlreadyInactive);
    app.dismiss_notification();
    assert!(app.state().notification.is_none());
}
