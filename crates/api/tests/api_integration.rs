//! Integration tests for the API server over the in-memory store.

use std::sync::{Arc, OnceLock};

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = Arc::new(AppState::new(InMemoryStore::new()));
    api::create_app(state, get_metrics_handle())
}

fn setup_production() -> axum::Router {
    let mut state = AppState::new(InMemoryStore::new());
    state.expose_error_detail = false;
    api::create_app(Arc::new(state), get_metrics_handle())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

struct Seed {
    species_id: i64,
    customer_id: i64,
    batch_id: i64,
}

/// Creates species, farm, tank, customer and a batch of 100 through the API.
async fn seed(app: &axum::Router) -> Seed {
    let (status, species) = send(
        app,
        "POST",
        "/api/species",
        Some(json!({
            "common_name": "Betta",
            "scientific_name": "Betta splendens",
            "target_profit_margin": 20,
            "ideal_temp_min": 24,
            "ideal_temp_max": 28
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, farm) = send(app, "POST", "/api/farms", Some(json!({ "farm_name": "Delta" }))).await;
    let (status, tank) = send(
        app,
        "POST",
        "/api/tanks",
        Some(json!({ "farm_id": farm["farm_id"], "tank_name": "D-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tank["is_active"], true);

    let (_, customer) = send(
        app,
        "POST",
        "/api/customers",
        Some(json!({ "company_name": "Tropical Traders", "country_code": "SG" })),
    )
    .await;
    let (status, batch) = send(
        app,
        "POST",
        "/api/batches",
        Some(json!({
            "species_id": species["species_id"],
            "tank_id": tank["tank_id"],
            "birth_date": "2026-01-10",
            "initial_quantity": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(batch["stage"], "Fry");

    Seed {
        species_id: species["species_id"].as_i64().unwrap(),
        customer_id: customer["customer_id"].as_i64().unwrap(),
        batch_id: batch["batch_id"].as_i64().unwrap(),
    }
}

async fn create_order(app: &axum::Router, seed: &Seed) -> i64 {
    let (status, order) = send(
        app,
        "POST",
        "/api/orders",
        Some(json!({
            "customer_id": seed.customer_id,
            "items": [
                { "species_id": seed.species_id, "quantity_requested": 10, "unit_price": 2.5 },
                { "species_id": seed.species_id, "quantity_requested": 4, "unit_price": 1.25 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    order["order_id"].as_i64().unwrap()
}

mod service {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let (status, json) = send(&setup(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_lists_resources() {
        let (status, json) = send(&setup(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["endpoints"]["waterLogs"], "/api/water-logs");
        assert_eq!(json["endpoints"]["analytics"], "/api/analytics");
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let (status, json) = send(&setup(), "GET", "/api/ponds", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_metrics_after_order() {
        let app = setup();
        let seed = seed(&app).await;
        create_order(&app, &seed).await;

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_created_total"));
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_species_crud() {
        let app = setup();
        let (_, created) = send(
            &app,
            "POST",
            "/api/species",
            Some(json!({ "common_name": "Molly" })),
        )
        .await;
        let id = created["species_id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/species/{id}"),
            Some(json!({ "common_name": "Sailfin Molly", "target_profit_margin": 35 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["common_name"], "Sailfin Molly");

        let (status, json) = send(&app, "DELETE", &format!("/api/species/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Species deleted successfully");

        let (status, json) = send(&app, "GET", &format!("/api/species/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Species not found");
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let (status, json) = send(
            &setup(),
            "POST",
            "/api/farms",
            Some(json!({ "farm_name": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "farm_name is required");
    }

    #[tokio::test]
    async fn test_farm_performance() {
        let app = setup();
        seed(&app).await;

        let (status, json) = send(&app, "GET", "/api/farms/performance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["farm_name"], "Delta");
        assert_eq!(json[0]["current_stock"], 100);
    }
}

mod production {
    use super::*;

    #[tokio::test]
    async fn test_missing_ledger_reads_as_zeros() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/batches/{}/financials", seed.batch_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_feed_cost"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn test_negative_ledger_component_rejected() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/batches/{}/financials", seed.batch_id),
            Some(json!({ "total_labor_cost": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feeding_log_and_summary() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/feeding-logs",
            Some(json!({
                "batch_id": seed.batch_id,
                "food_type": "Bloodworm",
                "amount_grams": 2000,
                "cost_per_kg": 3.5
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, summary) = send(
            &app,
            "GET",
            &format!("/api/feeding-logs/batch/{}/summary", seed.batch_id),
            None,
        )
        .await;
        assert_eq!(summary["total_feedings"], 1);
        assert_eq!(summary["total_cost"].as_f64(), Some(7.0));

        let (_, ledger) = send(
            &app,
            "GET",
            &format!("/api/batches/{}/financials", seed.batch_id),
            None,
        )
        .await;
        assert_eq!(ledger["total_feed_cost"].as_f64(), Some(7.0));
    }

    #[tokio::test]
    async fn test_water_log_filters_by_status() {
        let app = setup();
        seed(&app).await;

        let (status, log) = send(
            &app,
            "POST",
            "/api/water-logs",
            Some(json!({ "tank_id": 1, "ph_level": 7.0, "temperature": 26 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(log["status"], "normal");

        let (_, normal) = send(&app, "GET", "/api/water-logs?status=normal", None).await;
        assert_eq!(normal.as_array().unwrap().len(), 1);
        let (_, critical) = send(&app, "GET", "/api/water-logs?status=critical", None).await;
        assert!(critical.as_array().unwrap().is_empty());

        let (_, compliance) = send(&app, "GET", "/api/water-logs/tank/1/compliance", None).await;
        assert_eq!(compliance[0]["temperature_compliant"], true);
    }

    #[tokio::test]
    async fn test_malformed_filter_is_rejected() {
        let app = setup();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/orders?status=teleported")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod sales {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_order() {
        let app = setup();
        let seed = seed(&app).await;
        let order_id = create_order(&app, &seed).await;

        let (status, order) = send(&app, "GET", &format!("/api/orders/{order_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "pending");
        assert_eq!(order["currency_code"], "USD");
        assert_eq!(order["total_value"].as_f64(), Some(30.0));
        assert_eq!(order["company_name"], "Tropical Traders");
        assert_eq!(order["items"].as_array().unwrap().len(), 2);
        assert_eq!(order["items"][0]["species_name"], "Betta");
    }

    #[tokio::test]
    async fn test_order_for_unknown_customer_fails_whole() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "customer_id": 404,
                "items": [{ "species_id": seed.species_id, "quantity_requested": 1, "unit_price": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to create order");
        assert!(json["detail"].as_str().is_some());

        let (_, orders) = send(&app, "GET", "/api/orders", None).await;
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_production_hides_error_detail() {
        let app = setup_production();
        let (status, json) = send(
            &app,
            "POST",
            "/api/shipments",
            Some(json!({ "order_id": 77, "details": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to create shipment");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_invalid_item_quantity_is_bad_request() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "customer_id": seed.customer_id,
                "items": [{ "species_id": seed.species_id, "quantity_requested": 0, "unit_price": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "quantity_requested must be greater than zero");
    }

    #[tokio::test]
    async fn test_oversized_unit_price_is_bad_request() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "customer_id": seed.customer_id,
                "items": [{ "species_id": seed.species_id, "quantity_requested": 3, "unit_price": 1e25 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unit_price must not exceed 1000000000000");

        let (_, orders) = send(&app, "GET", "/api/orders", None).await;
        assert_eq!(orders.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_order_status_updates() {
        let app = setup();
        let seed = seed(&app).await;
        let order_id = create_order(&app, &seed).await;
        let uri = format!("/api/orders/{order_id}/status");

        let (status, json) = send(&app, "PATCH", &uri, Some(json!({ "status": "teleported" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid order status 'teleported'");

        for _ in 0..2 {
            let (status, json) = send(&app, "PATCH", &uri, Some(json!({ "status": "confirmed" }))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "confirmed");
        }

        let (status, _) = send(
            &app,
            "PATCH",
            "/api/orders/999/status",
            Some(json!({ "status": "confirmed" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_shipment_snapshot_and_traceability() {
        let app = setup();
        let seed = seed(&app).await;
        let order_id = create_order(&app, &seed).await;

        send(
            &app,
            "PUT",
            &format!("/api/batches/{}/financials", seed.batch_id),
            Some(json!({ "total_feed_cost": 10, "total_labor_cost": 5, "water_electricity_cost": 0 })),
        )
        .await;

        let (status, shipment) = send(
            &app,
            "POST",
            "/api/shipments",
            Some(json!({
                "order_id": order_id,
                "airway_bill_no": "AWB-77",
                "details": [{ "batch_id": seed.batch_id, "quantity_shipped": 10, "box_label_id": "B-1" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(shipment["status"], "preparing");
        assert_eq!(shipment["details"][0]["batch_cost_at_shipment"].as_f64(), Some(15.0));
        let shipment_id = shipment["shipment_id"].as_i64().unwrap();

        let (status, delivered) = send(
            &app,
            "PATCH",
            &format!("/api/shipments/{shipment_id}/status"),
            Some(json!({ "status": "delivered", "actual_delivery_date": "2026-02-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(delivered["actual_delivery_date"], "2026-02-01");

        let (_, trace) = send(
            &app,
            "GET",
            &format!("/api/shipments/{shipment_id}/traceability"),
            None,
        )
        .await;
        assert_eq!(trace[0]["box_label_id"], "B-1");
        assert_eq!(trace[0]["customer_id"].as_i64(), Some(seed.customer_id));

        let (_, report) = send(
            &app,
            "GET",
            &format!("/api/analytics/traceability/report?customer_id={}", seed.customer_id),
            None,
        )
        .await;
        assert_eq!(report.as_array().unwrap().len(), 1);

        let (status, json) = send(&app, "DELETE", &format!("/api/batches/{}", seed.batch_id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Cannot delete batch: it is referenced by shipment history (traceability)"
        );
    }
}

mod analytics {
    use super::*;

    #[tokio::test]
    async fn test_selling_price() {
        let app = setup();
        let seed = seed(&app).await;
        send(
            &app,
            "PUT",
            &format!("/api/batches/{}/financials", seed.batch_id),
            Some(json!({ "total_feed_cost": 15 })),
        )
        .await;

        let (status, json) = send(
            &app,
            "GET",
            &format!(
                "/api/analytics/pricing/batch/{}/calculate?transport_cost=5",
                seed.batch_id
            ),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["selling_price"].as_f64(), Some(0.24));
        assert_eq!(json["transport_cost"].as_f64(), Some(5.0));
        assert_eq!(json["packaging_cost"].as_f64(), Some(0.0));

        let (status, _) = send(
            &app,
            "GET",
            "/api/analytics/pricing/batch/999/calculate",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_high_risk_threshold_range() {
        let app = setup();
        let (status, _) = send(&app, "GET", "/api/analytics/mortality/high-risk?threshold=150", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, json) = send(&app, "GET", "/api/analytics/mortality/high-risk", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mass_mortality_alert_and_resolution() {
        let app = setup();
        let seed = seed(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/health-logs",
            Some(json!({ "batch_id": seed.batch_id, "mortality_count": 30, "condition_notes": "ich" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, alerts) = send(&app, "GET", "/api/analytics/alerts/biosecurity", None).await;
        let alert_id = alerts[0]["alert_id"].as_i64().unwrap();

        let (status, resolved) = send(
            &app,
            "PATCH",
            &format!("/api/analytics/alerts/{alert_id}/status"),
            Some(json!({ "status": "resolved", "resolved_by": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["resolved_by"], 3);
        assert!(resolved["resolved_at"].is_string());

        let (_, trace) = send(
            &app,
            "GET",
            &format!("/api/analytics/traceability/batch/{}", seed.batch_id),
            None,
        )
        .await;
        assert_eq!(trace["total_deaths"], 30);
        assert_eq!(trace["current_quantity"], 70);

        let (_, high_risk) = send(&app, "GET", "/api/analytics/mortality/high-risk", None).await;
        assert_eq!(high_risk[0]["mortality_rate"].as_f64(), Some(30.0));
    }
}
