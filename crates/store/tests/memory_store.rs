//! Behaviour of the in-memory store: aggregate creation, cost snapshots,
//! write rules and list filters.

use chrono::NaiveDate;
use common::{
    AlertSeverity, AlertStatus, BatchId, CustomerId, CustomerInput, FarmInput, FinancialsInput,
    NewBatch, NewFeedingLog, NewHealthLog, NewOrder, NewOrderItem, NewShipment,
    NewShipmentDetail, NewWaterLog, OrderId, OrderStatus, ShipmentStatus, SpeciesId,
    SpeciesInput, TankId, TankInput, WaterQualityStatus,
};
use rust_decimal::Decimal;
use store::{
    AlertFilter, AnalyticsStore, BatchFilter, CatalogStore, ConstraintKind, InMemoryStore,
    OrderFilter, PricingFilter, ProductionStore, SHIPMENT_DETAIL_BATCH_FK, SalesStore,
    StoreError, TraceabilityFilter, WaterLogFilter,
};

struct Fixture {
    store: InMemoryStore,
    species_id: SpeciesId,
    tank_id: TankId,
    customer_id: CustomerId,
    batch_id: BatchId,
}

fn dec(value: i64, scale: u32) -> Decimal {
    Decimal::new(value, scale)
}

async fn fixture() -> Fixture {
    let store = InMemoryStore::new();

    let species = store
        .create_species(SpeciesInput {
            common_name: "Neon Tetra".to_string(),
            scientific_name: Some("Paracheirodon innesi".to_string()),
            target_profit_margin: Some(Decimal::from(20)),
            ideal_temp_min: Some(Decimal::from(22)),
            ideal_temp_max: Some(Decimal::from(26)),
            ideal_ph_min: Some(dec(60, 1)),
            ideal_ph_max: Some(dec(70, 1)),
            ..Default::default()
        })
        .await
        .unwrap();
    let farm = store
        .create_farm(FarmInput {
            farm_name: "Riverside".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let tank = store
        .create_tank(TankInput {
            farm_id: farm.farm_id,
            tank_name: "T-1".to_string(),
            tank_type: Some("glass".to_string()),
            volume_liters: Some(Decimal::from(500)),
            is_active: None,
        })
        .await
        .unwrap();
    let customer = store
        .create_customer(CustomerInput {
            company_name: "Aqua Imports".to_string(),
            country_code: Some("DE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let batch = store
        .create_batch(NewBatch {
            species_id: species.species_id,
            tank_id: tank.tank_id,
            birth_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            initial_quantity: 1000,
            stage: None,
            estimated_harvest_date: None,
        })
        .await
        .unwrap();

    Fixture {
        store,
        species_id: species.species_id,
        tank_id: tank.tank_id,
        customer_id: customer.customer_id,
        batch_id: batch.batch_id,
    }
}

fn order_for(f: &Fixture, items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        customer_id: f.customer_id,
        delivery_address: None,
        currency_code: None,
        created_by: None,
        notes: None,
        items,
    }
}

fn item(species_id: SpeciesId, quantity: i32, unit_price: Decimal) -> NewOrderItem {
    NewOrderItem {
        species_id,
        quantity_requested: quantity,
        unit_price,
    }
}

fn shipment_for(order_id: OrderId, details: Vec<NewShipmentDetail>) -> NewShipment {
    NewShipment {
        order_id,
        airway_bill_no: Some("AWB-1".to_string()),
        driver_name: None,
        vehicle_number: None,
        transport_cost: None,
        packaging_cost: None,
        details,
    }
}

fn detail(batch_id: BatchId, quantity: i32, label: &str) -> NewShipmentDetail {
    NewShipmentDetail {
        batch_id,
        quantity_shipped: quantity,
        box_label_id: Some(label.to_string()),
    }
}

async fn seeded_order(f: &Fixture) -> OrderId {
    f.store
        .create_order(order_for(f, vec![item(f.species_id, 10, dec(150, 2))]))
        .await
        .unwrap()
        .order
        .order_id
}

#[tokio::test]
async fn order_is_created_with_items_in_input_order() {
    let f = fixture().await;

    let order = f
        .store
        .create_order(order_for(
            &f,
            vec![
                item(f.species_id, 10, dec(150, 2)),
                item(f.species_id, 4, dec(250, 2)),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.order.currency_code, "USD");
    assert_eq!(order.order.total_value, dec(2500, 2));
    assert_eq!(order.company_name, "Aqua Imports");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].quantity_requested, 10);
    assert_eq!(order.items[0].species_name, "Neon Tetra");
    assert_eq!(order.items[1].line_total, dec(1000, 2));
}

#[tokio::test]
async fn failed_order_leaves_no_rows() {
    let f = fixture().await;

    let result = f
        .store
        .create_order(order_for(
            &f,
            vec![
                item(f.species_id, 10, dec(150, 2)),
                item(SpeciesId::new(999), 1, Decimal::ONE),
            ],
        ))
        .await;

    match result {
        Err(StoreError::TransactionAborted { aggregate, source }) => {
            assert_eq!(aggregate, "order");
            assert_eq!(source.constraint(), Some("order_item_species_id_fkey"));
        }
        other => panic!("expected aborted creation, got {other:?}"),
    }

    let orders = f.store.list_orders(&OrderFilter::default()).await.unwrap();
    assert!(orders.is_empty());
    assert!(f.store.get_order(OrderId::new(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn order_for_unknown_customer_is_aborted() {
    let f = fixture().await;
    let mut input = order_for(&f, vec![]);
    input.customer_id = CustomerId::new(42);

    let err = f.store.create_order(input).await.unwrap_err();
    assert!(matches!(err, StoreError::TransactionAborted { .. }));
}

#[tokio::test]
async fn overflowing_line_total_aborts_the_order() {
    let f = fixture().await;

    let result = f
        .store
        .create_order(order_for(&f, vec![item(f.species_id, 3, Decimal::MAX)]))
        .await;

    match result {
        Err(StoreError::TransactionAborted { aggregate, source }) => {
            assert_eq!(aggregate, "order");
            assert_eq!(source.constraint(), Some("order_item_line_total_check"));
        }
        other => panic!("expected aborted creation, got {other:?}"),
    }
    assert!(f.store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn overflowing_order_total_aborts_the_order() {
    let f = fixture().await;
    let half = Decimal::MAX / Decimal::TWO;

    let err = f
        .store
        .create_order(order_for(
            &f,
            vec![item(f.species_id, 1, half), item(f.species_id, 1, half), item(f.species_id, 1, half)],
        ))
        .await
        .unwrap_err();

    match err {
        StoreError::TransactionAborted { source, .. } => {
            assert_eq!(source.constraint(), Some("customer_order_total_value_check"));
        }
        other => panic!("expected aborted creation, got {other:?}"),
    }
    assert!(f.store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn shipment_detail_snapshots_ledger_total() {
    let f = fixture().await;
    f.store
        .upsert_financials(
            f.batch_id,
            FinancialsInput {
                total_feed_cost: Some(Decimal::from(10)),
                total_labor_cost: Some(Decimal::from(5)),
                water_electricity_cost: Some(Decimal::ZERO),
                medication_cost: None,
            },
        )
        .await
        .unwrap();
    let order_id = seeded_order(&f).await;

    let shipment = f
        .store
        .create_shipment(shipment_for(order_id, vec![detail(f.batch_id, 100, "BX1")]))
        .await
        .unwrap();

    assert_eq!(shipment.shipment.status, ShipmentStatus::Preparing);
    assert_eq!(shipment.shipment.transport_cost, Decimal::ZERO);
    assert_eq!(shipment.details.len(), 1);
    assert_eq!(shipment.details[0].batch_cost_at_shipment, Decimal::from(15));
    assert_eq!(shipment.details[0].box_label_id.as_deref(), Some("BX1"));
    assert_eq!(shipment.details[0].farm_name, "Riverside");
}

#[tokio::test]
async fn snapshot_survives_later_ledger_changes() {
    let f = fixture().await;
    f.store
        .upsert_financials(
            f.batch_id,
            FinancialsInput {
                total_feed_cost: Some(Decimal::from(10)),
                total_labor_cost: Some(Decimal::from(5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let order_id = seeded_order(&f).await;
    let shipment = f
        .store
        .create_shipment(shipment_for(order_id, vec![detail(f.batch_id, 50, "BX1")]))
        .await
        .unwrap();

    f.store
        .upsert_financials(
            f.batch_id,
            FinancialsInput {
                total_feed_cost: Some(Decimal::from(400)),
                medication_cost: Some(Decimal::from(25)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reread = f
        .store
        .get_shipment(shipment.shipment.shipment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.details[0].batch_cost_at_shipment, Decimal::from(15));

    let trace = f
        .store
        .traceability_report(&TraceabilityFilter::for_shipment(
            shipment.shipment.shipment_id,
        ))
        .await
        .unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].batch_cost_at_shipment, Decimal::from(15));
    assert_eq!(trace[0].customer_name, "Aqua Imports");
}

#[tokio::test]
async fn batch_without_ledger_snapshots_zero() {
    let f = fixture().await;
    let order_id = seeded_order(&f).await;

    let shipment = f
        .store
        .create_shipment(shipment_for(order_id, vec![detail(f.batch_id, 1, "BX9")]))
        .await
        .unwrap();
    assert_eq!(shipment.details[0].batch_cost_at_shipment, Decimal::ZERO);
}

#[tokio::test]
async fn failed_shipment_leaves_no_rows() {
    let f = fixture().await;
    let order_id = seeded_order(&f).await;

    let err = f
        .store
        .create_shipment(shipment_for(
            order_id,
            vec![detail(f.batch_id, 10, "BX1"), detail(f.batch_id, 0, "BX2")],
        ))
        .await
        .unwrap_err();
    let StoreError::TransactionAborted { source, .. } = err else {
        panic!("expected aborted creation");
    };
    assert_eq!(
        source.constraint(),
        Some("shipment_detail_quantity_shipped_check")
    );

    let shipments = f
        .store
        .list_shipments(&Default::default())
        .await
        .unwrap();
    assert!(shipments.is_empty());
    // The batch is still free of shipment history.
    assert!(f.store.delete_batch(f.batch_id).await.unwrap());
}

#[tokio::test]
async fn repeated_status_update_returns_the_row() {
    let f = fixture().await;
    let order_id = seeded_order(&f).await;

    let first = f
        .store
        .update_order_status(order_id, OrderStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    let second = f
        .store
        .update_order_status(order_id, OrderStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(second.status, OrderStatus::Confirmed);

    let missing = f
        .store
        .update_order_status(OrderId::new(77), OrderStatus::Confirmed)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn shipment_status_sets_delivery_date() {
    let f = fixture().await;
    let order_id = seeded_order(&f).await;
    let shipment = f
        .store
        .create_shipment(shipment_for(order_id, vec![detail(f.batch_id, 5, "BX1")]))
        .await
        .unwrap();
    let delivered_on = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

    let updated = f
        .store
        .update_shipment_status(
            shipment.shipment.shipment_id,
            ShipmentStatus::Delivered,
            Some(delivered_on),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ShipmentStatus::Delivered);
    assert_eq!(updated.actual_delivery_date, Some(delivered_on));
}

#[tokio::test]
async fn list_filters_are_conjunctive_and_optional() {
    let f = fixture().await;
    let other = f
        .store
        .create_customer(CustomerInput {
            company_name: "Blue Lagoon".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let first = seeded_order(&f).await;
    let second = seeded_order(&f).await;
    let mut input = order_for(&f, vec![]);
    input.customer_id = other.customer_id;
    f.store.create_order(input).await.unwrap();
    f.store
        .update_order_status(second, OrderStatus::Shipped)
        .await
        .unwrap();

    let all = f.store.list_orders(&OrderFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    // Same order date, so the newest id comes first.
    assert_eq!(all[0].order.order_id, OrderId::new(3));

    let by_customer = f
        .store
        .list_orders(&OrderFilter {
            customer_id: Some(f.customer_id),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_customer.len(), 2);

    let both = f
        .store
        .list_orders(&OrderFilter {
            customer_id: Some(f.customer_id),
            status: Some(OrderStatus::Pending),
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].order.order_id, first);
}

#[tokio::test]
async fn batch_with_shipment_history_cannot_be_deleted() {
    let f = fixture().await;
    let order_id = seeded_order(&f).await;
    f.store
        .create_shipment(shipment_for(order_id, vec![detail(f.batch_id, 5, "BX1")]))
        .await
        .unwrap();

    let err = f.store.delete_batch(f.batch_id).await.unwrap_err();
    match &err {
        StoreError::ConstraintViolation {
            kind, constraint, ..
        } => {
            assert_eq!(*kind, ConstraintKind::ForeignKey);
            assert_eq!(constraint.as_deref(), Some(SHIPMENT_DETAIL_BATCH_FK));
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
    assert!(f.store.get_batch(f.batch_id).await.unwrap().is_some());
}

#[tokio::test]
async fn feeding_accrues_into_the_ledger() {
    let f = fixture().await;

    f.store
        .create_feeding_log(NewFeedingLog {
            batch_id: f.batch_id,
            food_type: "pellet".to_string(),
            amount_grams: Decimal::from(2000),
            cost_per_kg: dec(350, 2),
            recorded_by: None,
            notes: None,
        })
        .await
        .unwrap();

    let ledger = f.store.get_financials(f.batch_id).await.unwrap().unwrap();
    assert_eq!(ledger.total_feed_cost, Some(dec(700, 2)));
    assert_eq!(ledger.total_cost(), dec(700, 2));

    let summary = f.store.feeding_summary(f.batch_id).await.unwrap();
    assert_eq!(summary.total_feedings, 1);
    assert_eq!(summary.total_cost, dec(700, 2));
}

#[tokio::test]
async fn mass_mortality_lowers_stock_and_raises_alert() {
    let f = fixture().await;

    f.store
        .create_health_log(NewHealthLog {
            batch_id: f.batch_id,
            condition_notes: Some("gill disease".to_string()),
            treatment_applied: None,
            mortality_count: Some(150),
            recorded_by: None,
        })
        .await
        .unwrap();

    let batch = f.store.get_batch(f.batch_id).await.unwrap().unwrap();
    assert_eq!(batch.current_quantity, 850);

    let alerts = f.store.active_biosecurity_alerts().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::High);
    assert_eq!(alerts[0].species_name.as_deref(), Some("Neon Tetra"));

    let summary = f.store.health_summary(f.batch_id).await.unwrap();
    assert_eq!(summary.total_deaths, 150);
    assert_eq!(summary.disease_events, 1);

    let risky = f.store.high_risk_batches(Decimal::from(10)).await.unwrap();
    assert_eq!(risky.len(), 1);
    assert_eq!(risky[0].mortality_rate, Decimal::from(15));
}

#[tokio::test]
async fn small_losses_do_not_alert() {
    let f = fixture().await;

    f.store
        .create_health_log(NewHealthLog {
            batch_id: f.batch_id,
            condition_notes: None,
            treatment_applied: None,
            mortality_count: Some(5),
            recorded_by: None,
        })
        .await
        .unwrap();

    assert!(f.store.active_biosecurity_alerts().await.unwrap().is_empty());
}

#[tokio::test]
async fn water_readings_are_classified() {
    let f = fixture().await;
    let reading = |temperature: i64, oxygen: i64| NewWaterLog {
        tank_id: f.tank_id,
        ph_level: Some(dec(65, 1)),
        temperature: Some(Decimal::from(temperature)),
        dissolved_oxygen: Some(dec(oxygen, 1)),
        ammonia_level: Some(dec(1, 1)),
        measured_by_user_id: None,
    };

    let normal = f.store.create_water_log(reading(24, 70)).await.unwrap();
    let warm = f.store.create_water_log(reading(29, 70)).await.unwrap();
    let suffocating = f.store.create_water_log(reading(24, 30)).await.unwrap();

    assert_eq!(normal.status, WaterQualityStatus::Normal);
    assert_eq!(warm.status, WaterQualityStatus::Warning);
    assert_eq!(suffocating.status, WaterQualityStatus::Critical);

    let critical = f
        .store
        .list_water_logs(&WaterLogFilter {
            status: Some(WaterQualityStatus::Critical),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(critical.len(), 1);

    let alerts = f.store.list_alerts(&AlertFilter::default()).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[0].farm_name.as_deref(), Some("Riverside"));

    let compliance = f.store.water_compliance(f.tank_id).await.unwrap();
    assert_eq!(compliance.len(), 1);
    assert!(compliance[0].temperature_compliant);
}

#[tokio::test]
async fn resolving_an_alert_stamps_the_resolver() {
    let f = fixture().await;
    f.store
        .create_health_log(NewHealthLog {
            batch_id: f.batch_id,
            condition_notes: None,
            treatment_applied: None,
            mortality_count: Some(500),
            recorded_by: None,
        })
        .await
        .unwrap();
    let alerts = f.store.active_biosecurity_alerts().await.unwrap();

    let resolved = f
        .store
        .update_alert_status(alerts[0].alert_id, AlertStatus::Resolved, Some(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(7));
    assert!(resolved.resolved_at.is_some());
    assert!(f.store.active_biosecurity_alerts().await.unwrap().is_empty());
}

#[tokio::test]
async fn pricing_applies_target_margin() {
    let f = fixture().await;
    f.store
        .upsert_financials(
            f.batch_id,
            FinancialsInput {
                total_feed_cost: Some(Decimal::from(500)),
                total_labor_cost: Some(Decimal::from(500)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let pricing = f.store.batch_pricing(f.batch_id).await.unwrap().unwrap();
    assert_eq!(pricing.cost_per_unit, dec(100, 2));
    assert_eq!(pricing.suggested_unit_price, dec(120, 2));

    let price = f
        .store
        .selling_price(f.batch_id, Decimal::from(100), Decimal::from(100))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(price.selling_price, Some(dec(144, 2)));

    let overview = f
        .store
        .pricing_overview(&PricingFilter {
            species_id: Some(f.species_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overview.len(), 1);
}

#[tokio::test]
async fn overflowing_feeding_cost_leaves_the_ledger_alone() {
    let f = fixture().await;

    let err = f
        .store
        .create_feeding_log(NewFeedingLog {
            batch_id: f.batch_id,
            food_type: "pellet".to_string(),
            amount_grams: Decimal::MAX,
            cost_per_kg: Decimal::from(2000),
            recorded_by: None,
            notes: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::ConstraintViolation { kind: ConstraintKind::Check, .. }
    ));
    assert_eq!(err.constraint(), Some("batch_financials_total_feed_cost_check"));
    assert!(f.store.get_financials(f.batch_id).await.unwrap().is_none());
    assert_eq!(f.store.feeding_summary(f.batch_id).await.unwrap().total_feedings, 0);
}

#[tokio::test]
async fn overflowing_selling_price_is_an_error() {
    let f = fixture().await;
    f.store
        .upsert_financials(
            f.batch_id,
            FinancialsInput {
                total_feed_cost: Some(Decimal::MAX),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = f
        .store
        .selling_price(f.batch_id, Decimal::MAX, Decimal::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err.constraint(), Some("batch_selling_price_check"));
}

#[tokio::test]
async fn batch_list_filters_by_stage() {
    let f = fixture().await;

    let fry = f
        .store
        .list_batches(&BatchFilter {
            stage: Some("Fry".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(fry.len(), 1);
    assert_eq!(fry[0].farm_name, "Riverside");

    let adults = f
        .store
        .list_batches(&BatchFilter {
            stage: Some("Adult".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(adults.is_empty());
}

#[tokio::test]
async fn species_in_use_cannot_be_deleted() {
    let f = fixture().await;

    let err = f.store.delete_species(f.species_id).await.unwrap_err();
    assert_eq!(err.constraint(), Some("batch_species_id_fkey"));
    assert!(!f.store.delete_species(SpeciesId::new(99)).await.unwrap());
}
