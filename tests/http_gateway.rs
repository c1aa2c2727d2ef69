use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use floorplan_admin::gateway::{
    CircuitBreaker, CircuitState, GatewayError, HttpTableGateway, TableGateway,
};
use floorplan_admin::models::{Reservation, Table, TablePatch, TableShape, TableStatus};

fn table(x: i32, y: i32) -> Table {
    Table {
        id: 1,
        number: 1,
        hall_id: "white".to_string(),
        capacity: 4,
        x,
        y,
        width: 60,
        height: 60,
        status: TableStatus::Available,
        shape: TableShape::Round,
    }
}

fn gateway(server: &MockServer, threshold: u32) -> HttpTableGateway {
    let breaker = Arc::new(CircuitBreaker::new(threshold, 30));
    HttpTableGateway::new(&server.uri(), Duration::from_secs(2), breaker).unwrap()
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/tables/1"))
        .and(body_json(serde_json::json!({ "x": 110, "y": 150 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(table(110, 150)))
        .expect(1)
        .mount(&server)
        .await;

    let updated = gateway(&server, 5)
        .update_table(1, &TablePatch::position(110, 150))
        .await
        .unwrap();
    assert_eq!((updated.x, updated.y), (110, 150));
}

#[tokio::test]
async fn lists_tables_of_a_hall() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tables"))
        .and(query_param("hall_id", "white"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![table(60, 120)]))
        .mount(&server)
        .await;

    let tables = gateway(&server, 5).list_tables(Some("white")).await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].hall_id, "white");
}

#[tokio::test]
async fn missing_table_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/tables/7"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "error": "Стол не найден" })),
        )
        .mount(&server)
        .await;

    let err = gateway(&server, 5)
        .update_table(7, &TablePatch::position(0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(7)));
}

#[tokio::test]
async fn validation_error_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "width too small" })),
        )
        .mount(&server)
        .await;

    let gw = gateway(&server, 1);
    let err = gw.update_table(1, &TablePatch::size(10, 10)).await.unwrap_err();
    match err {
        GatewayError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "width too small");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Client errors do not count against the backend
    assert_eq!(gw.circuit_breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn server_errors_open_the_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let gw = gateway(&server, 2);
    for _ in 0..2 {
        let err = gw.update_table(1, &TablePatch::position(5, 5)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 500, .. }));
    }
    assert_eq!(gw.circuit_breaker().state(), CircuitState::Open);

    let err = gw.update_table(1, &TablePatch::position(5, 5)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable));
}

#[tokio::test]
async fn fetches_reservations_of_one_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .and(query_param("table_id", "1"))
        .and(query_param("date", "2026-10-20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 3,
            "table_id": 1,
            "customer_name": "Айгерим",
            "customer_phone": "+7 701 000 00 00",
            "guests": 2,
            "date": "2026-10-20",
            "time": "19:00",
            "duration": 120,
            "comment": null,
            "status": "active",
            "created_at": "2026-10-19T12:00:00"
        }])))
        .mount(&server)
        .await;

    let list: Vec<Reservation> = gateway(&server, 5).reservations(1, "2026-10-20").await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0].is_active());
}
