//! HTTP client tests against a WireMock container serving recorded
//! delivery service responses from `tests/fixtures/wiremock`.
//!
//! Run with `cargo test -- --ignored` on a machine with Docker.

use testcontainers::core::{IntoContainerPort, Mount, WaitFor};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, TestcontainersError};

use jiff::civil::date;

use route_planner::api::{ApiConfig, DeliveryApiClient};
use route_planner::error::TransportError;
use route_planner::model::OrderId;
use route_planner::resolver::SourceTier;
use route_planner::session::{DateRange, PlanningSession, SessionState};
use route_planner::traits::DeliveryBackend;

fn wiremock_container() -> Result<(Container<GenericImage>, DeliveryApiClient), TestcontainersError> {
    let stubs = format!("{}/tests/fixtures/wiremock", env!("CARGO_MANIFEST_DIR"));

    let image = GenericImage::new("wiremock/wiremock", "3.9.1")
        .with_exposed_port(8080.tcp())
        .with_wait_for(WaitFor::message_on_stdout("port:"))
        .with_mount(Mount::bind_mount(stubs, "/home/wiremock"))
        .with_startup_timeout(std::time::Duration::from_secs(60));

    let container = image.start()?;
    let port = container.get_host_port_ipv4(8080.tcp())?;

    let config = ApiConfig {
        base_url: format!("http://127.0.0.1:{}/api", port),
        timeout_secs: 10,
    };
    let client = DeliveryApiClient::new(config)
        .map_err(|err| TestcontainersError::other(format!("client build failed: {err}")))?;

    Ok((container, client))
}

#[test]
#[ignore = "requires Docker"]
fn fetches_candidates_and_plans_routes_over_http() {
    let (container, client) = wiremock_container().expect("start WireMock container");
    let range = DateRange::new(date(2024, 3, 4), date(2024, 3, 10)).unwrap();

    let raw = client.fetch_candidates(&range).expect("fetch candidates");
    assert_eq!(raw.len(), 3);

    let mut session = PlanningSession::new();
    session.request_candidates(&client, range).unwrap();
    assert_eq!(session.state(), &SessionState::CandidatesReady);
    assert_eq!(session.candidates().len(), 2);
    assert_eq!(session.report().dropped_candidates, 1);

    session.toggle_selection(&OrderId::from("o1")).unwrap();
    session.toggle_selection(&OrderId::from("o3")).unwrap();
    session.generate_routes(&client).unwrap();

    assert_eq!(session.state(), &SessionState::RoutesReady);
    assert_eq!(session.report().dropped_routes, 1);
    assert_eq!(session.paths().len(), 1);
    assert_eq!(session.paths()[0].source_tier, SourceTier::Leg);

    drop(container);
}

#[test]
#[ignore = "requires Docker"]
fn unsuccessful_envelope_is_rejected_with_its_message() {
    let (container, client) = wiremock_container().expect("start WireMock container");
    let range = DateRange::new(date(2023, 12, 31), date(2024, 1, 6)).unwrap();

    match client.fetch_candidates(&range) {
        Err(TransportError::Rejected(message)) => assert_eq!(message, "Rango de fechas inválido"),
        other => panic!("expected a rejected request, got {:?}", other.map(|batch| batch.len())),
    }

    drop(container);
}

#[test]
#[ignore = "requires Docker"]
fn unknown_endpoint_reports_http_status() {
    let (container, client) = wiremock_container().expect("start WireMock container");
    // No stub matches this range, WireMock answers 404.
    let range = DateRange::single_day(date(2030, 1, 1));

    match client.fetch_candidates(&range) {
        Err(TransportError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected an HTTP status error, got {:?}", other.map(|batch| batch.len())),
    }

    drop(container);
}
