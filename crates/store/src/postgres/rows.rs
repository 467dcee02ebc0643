//! Row to record mapping for the PostgreSQL backend.

use std::str::FromStr;

use common::{
    Alert, AlertId, Batch, BatchFinancials, BatchId, BatchTraceability, Customer, CustomerId, Farm,
    FarmId, FarmPerformance, FeedingLog, FeedingLogId, FeedingSummary, HealthLog, HealthLogId,
    HealthSummary, HighRiskBatch, MortalityAnalysis, Order, OrderId, OrderItem, OrderItemId,
    ParseStatusError, PricingOverview, Shipment, ShipmentDetail, ShipmentDetailId, ShipmentId,
    Species, SpeciesId, Tank, TankId, TraceabilityRecord, WaterCompliance, WaterLog, WaterLogId,
};
use rust_decimal::Decimal;
use sqlx::{Row, postgres::PgRow};

use crate::{Result, StoreError};

fn status<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: FromStr<Err = ParseStatusError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(StoreError::decode)
}

pub(super) fn species(row: &PgRow) -> Result<Species> {
    Ok(Species {
        species_id: SpeciesId::new(row.try_get("species_id")?),
        common_name: row.try_get("common_name")?,
        scientific_name: row.try_get("scientific_name")?,
        description: row.try_get("description")?,
        target_profit_margin: row.try_get("target_profit_margin")?,
        ideal_temp_min: row.try_get("ideal_temp_min")?,
        ideal_temp_max: row.try_get("ideal_temp_max")?,
        ideal_ph_min: row.try_get("ideal_ph_min")?,
        ideal_ph_max: row.try_get("ideal_ph_max")?,
    })
}

pub(super) fn farm(row: &PgRow) -> Result<Farm> {
    Ok(Farm {
        farm_id: FarmId::new(row.try_get("farm_id")?),
        farm_name: row.try_get("farm_name")?,
        location: row.try_get("location")?,
        license_number: row.try_get("license_number")?,
        manager_name: row.try_get("manager_name")?,
        phone: row.try_get("phone")?,
        total_capacity_liters: row.try_get("total_capacity_liters")?,
        established_date: row.try_get("established_date")?,
    })
}

pub(super) fn farm_performance(row: &PgRow) -> Result<FarmPerformance> {
    Ok(FarmPerformance {
        farm_id: FarmId::new(row.try_get("farm_id")?),
        farm_name: row.try_get("farm_name")?,
        tank_count: row.try_get("tank_count")?,
        active_batches: row.try_get("active_batches")?,
        current_stock: row.try_get("current_stock")?,
        initial_stock: row.try_get("initial_stock")?,
        mortality_rate: row.try_get("mortality_rate")?,
        total_cost: row.try_get("total_cost")?,
    })
}

pub(super) fn tank(row: &PgRow) -> Result<Tank> {
    Ok(Tank {
        tank_id: TankId::new(row.try_get("tank_id")?),
        farm_id: FarmId::new(row.try_get("farm_id")?),
        tank_name: row.try_get("tank_name")?,
        tank_type: row.try_get("tank_type")?,
        volume_liters: row.try_get("volume_liters")?,
        is_active: row.try_get("is_active")?,
        farm_name: row.try_get("farm_name")?,
    })
}

pub(super) fn customer(row: &PgRow) -> Result<Customer> {
    Ok(Customer {
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        company_name: row.try_get("company_name")?,
        contact_person: row.try_get("contact_person")?,
        contact_email: row.try_get("contact_email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        country_code: row.try_get("country_code")?,
        import_license_no: row.try_get("import_license_no")?,
    })
}

pub(super) fn batch(row: &PgRow) -> Result<Batch> {
    Ok(Batch {
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_id: SpeciesId::new(row.try_get("species_id")?),
        tank_id: TankId::new(row.try_get("tank_id")?),
        birth_date: row.try_get("birth_date")?,
        initial_quantity: row.try_get("initial_quantity")?,
        current_quantity: row.try_get("current_quantity")?,
        stage: row.try_get("stage")?,
        estimated_harvest_date: row.try_get("estimated_harvest_date")?,
        common_name: row.try_get("common_name")?,
        scientific_name: row.try_get("scientific_name")?,
        tank_name: row.try_get("tank_name")?,
        tank_type: row.try_get("tank_type")?,
        farm_id: FarmId::new(row.try_get("farm_id")?),
        farm_name: row.try_get("farm_name")?,
        location: row.try_get("location")?,
    })
}

pub(super) fn financials(row: &PgRow) -> Result<BatchFinancials> {
    Ok(BatchFinancials {
        batch_id: BatchId::new(row.try_get("batch_id")?),
        total_feed_cost: row.try_get("total_feed_cost")?,
        total_labor_cost: row.try_get("total_labor_cost")?,
        water_electricity_cost: row.try_get("water_electricity_cost")?,
        medication_cost: row.try_get("medication_cost")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn water_log(row: &PgRow) -> Result<WaterLog> {
    Ok(WaterLog {
        log_id: WaterLogId::new(row.try_get("log_id")?),
        tank_id: TankId::new(row.try_get("tank_id")?),
        ph_level: row.try_get("ph_level")?,
        temperature: row.try_get("temperature")?,
        dissolved_oxygen: row.try_get("dissolved_oxygen")?,
        ammonia_level: row.try_get("ammonia_level")?,
        measured_by_user_id: row.try_get("measured_by_user_id")?,
        measured_at: row.try_get("measured_at")?,
        status: status(row, "status")?,
        tank_name: row.try_get("tank_name")?,
        farm_name: row.try_get("farm_name")?,
    })
}

pub(super) fn water_compliance(row: &PgRow) -> Result<WaterCompliance> {
    Ok(WaterCompliance {
        tank_id: TankId::new(row.try_get("tank_id")?),
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_name: row.try_get("species_name")?,
        measured_at: row.try_get("measured_at")?,
        temperature: row.try_get("temperature")?,
        ideal_temp_min: row.try_get("ideal_temp_min")?,
        ideal_temp_max: row.try_get("ideal_temp_max")?,
        temperature_compliant: row.try_get("temperature_compliant")?,
        ph_level: row.try_get("ph_level")?,
        ideal_ph_min: row.try_get("ideal_ph_min")?,
        ideal_ph_max: row.try_get("ideal_ph_max")?,
        ph_compliant: row.try_get("ph_compliant")?,
    })
}

pub(super) fn feeding_log(row: &PgRow) -> Result<FeedingLog> {
    Ok(FeedingLog {
        feeding_id: FeedingLogId::new(row.try_get("feeding_id")?),
        batch_id: BatchId::new(row.try_get("batch_id")?),
        food_type: row.try_get("food_type")?,
        amount_grams: row.try_get("amount_grams")?,
        cost_per_kg: row.try_get("cost_per_kg")?,
        recorded_by: row.try_get("recorded_by")?,
        notes: row.try_get("notes")?,
        feed_time: row.try_get("feed_time")?,
        common_name: row.try_get("common_name")?,
    })
}

pub(super) fn feeding_summary(batch_id: BatchId, row: &PgRow) -> Result<FeedingSummary> {
    Ok(FeedingSummary {
        batch_id,
        total_feedings: row.try_get("total_feedings")?,
        total_grams: row.try_get("total_grams")?,
        total_cost: row.try_get("total_cost")?,
        first_feeding: row.try_get("first_feeding")?,
        last_feeding: row.try_get("last_feeding")?,
    })
}

pub(super) fn health_log(row: &PgRow) -> Result<HealthLog> {
    Ok(HealthLog {
        health_log_id: HealthLogId::new(row.try_get("health_log_id")?),
        batch_id: BatchId::new(row.try_get("batch_id")?),
        condition_notes: row.try_get("condition_notes")?,
        treatment_applied: row.try_get("treatment_applied")?,
        mortality_count: row.try_get("mortality_count")?,
        recorded_by: row.try_get("recorded_by")?,
        log_date: row.try_get("log_date")?,
        common_name: row.try_get("common_name")?,
    })
}

pub(super) fn health_summary(batch_id: BatchId, row: &PgRow) -> Result<HealthSummary> {
    Ok(HealthSummary {
        batch_id,
        total_health_logs: row.try_get("total_health_logs")?,
        total_deaths: row.try_get("total_deaths")?,
        disease_events: row.try_get("disease_events")?,
        first_log: row.try_get("first_log")?,
        last_log: row.try_get("last_log")?,
    })
}

pub(super) fn order(row: &PgRow) -> Result<Order> {
    Ok(Order {
        order_id: OrderId::new(row.try_get("order_id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        order_date: row.try_get("order_date")?,
        status: status(row, "status")?,
        total_value: row.try_get("total_value")?,
        currency_code: row.try_get("currency_code")?,
        delivery_address: row.try_get("delivery_address")?,
        created_by: row.try_get("created_by")?,
        notes: row.try_get("notes")?,
    })
}

pub(super) fn order_item(row: &PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        item_id: OrderItemId::new(row.try_get("item_id")?),
        species_id: SpeciesId::new(row.try_get("species_id")?),
        species_name: row.try_get("species_name")?,
        scientific_name: row.try_get("scientific_name")?,
        quantity_requested: row.try_get("quantity_requested")?,
        unit_price: row.try_get("unit_price")?,
        line_total: row.try_get("line_total")?,
    })
}

pub(super) fn shipment(row: &PgRow) -> Result<Shipment> {
    Ok(Shipment {
        shipment_id: ShipmentId::new(row.try_get("shipment_id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        shipment_date: row.try_get("shipment_date")?,
        airway_bill_no: row.try_get("airway_bill_no")?,
        driver_name: row.try_get("driver_name")?,
        vehicle_number: row.try_get("vehicle_number")?,
        transport_cost: row.try_get("transport_cost")?,
        packaging_cost: row.try_get("packaging_cost")?,
        status: status(row, "status")?,
        actual_delivery_date: row.try_get("actual_delivery_date")?,
    })
}

pub(super) fn shipment_detail(row: &PgRow) -> Result<ShipmentDetail> {
    Ok(ShipmentDetail {
        detail_id: ShipmentDetailId::new(row.try_get("detail_id")?),
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_name: row.try_get("species_name")?,
        farm_name: row.try_get("farm_name")?,
        tank_name: row.try_get("tank_name")?,
        birth_date: row.try_get("birth_date")?,
        quantity_shipped: row.try_get("quantity_shipped")?,
        box_label_id: row.try_get("box_label_id")?,
        batch_cost_at_shipment: row.try_get("batch_cost_at_shipment")?,
    })
}

pub(super) fn alert(row: &PgRow) -> Result<Alert> {
    Ok(Alert {
        alert_id: AlertId::new(row.try_get("alert_id")?),
        tank_id: row.try_get::<Option<i32>, _>("tank_id")?.map(TankId::new),
        batch_id: row.try_get::<Option<i32>, _>("batch_id")?.map(BatchId::new),
        alert_type: row.try_get("alert_type")?,
        severity: status(row, "severity")?,
        message: row.try_get("message")?,
        status: status(row, "status")?,
        created_at: row.try_get("created_at")?,
        resolved_at: row.try_get("resolved_at")?,
        resolved_by: row.try_get("resolved_by")?,
        tank_name: row.try_get("tank_name")?,
        farm_id: row.try_get::<Option<i32>, _>("farm_id")?.map(FarmId::new),
        farm_name: row.try_get("farm_name")?,
        species_name: row.try_get("species_name")?,
    })
}

pub(super) fn mortality_analysis(row: &PgRow) -> Result<MortalityAnalysis> {
    Ok(MortalityAnalysis {
        species_id: SpeciesId::new(row.try_get("species_id")?),
        common_name: row.try_get("common_name")?,
        batch_count: row.try_get("batch_count")?,
        total_initial: row.try_get("total_initial")?,
        total_current: row.try_get("total_current")?,
        mortality_rate: row.try_get("mortality_rate")?,
    })
}

pub(super) fn high_risk_batch(row: &PgRow) -> Result<HighRiskBatch> {
    Ok(HighRiskBatch {
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_name: row.try_get("species_name")?,
        farm_name: row.try_get("farm_name")?,
        tank_name: row.try_get("tank_name")?,
        stage: row.try_get("stage")?,
        initial_quantity: row.try_get("initial_quantity")?,
        current_quantity: row.try_get("current_quantity")?,
        mortality_rate: row.try_get("mortality_rate")?,
    })
}

pub(super) fn batch_traceability(row: &PgRow) -> Result<BatchTraceability> {
    Ok(BatchTraceability {
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_name: row.try_get("species_name")?,
        scientific_name: row.try_get("scientific_name")?,
        farm_name: row.try_get("farm_name")?,
        tank_name: row.try_get("tank_name")?,
        birth_date: row.try_get("birth_date")?,
        stage: row.try_get("stage")?,
        initial_quantity: row.try_get("initial_quantity")?,
        current_quantity: row.try_get("current_quantity")?,
        total_feedings: row.try_get("total_feedings")?,
        total_feed_grams: row.try_get("total_feed_grams")?,
        total_health_logs: row.try_get("total_health_logs")?,
        total_deaths: row.try_get("total_deaths")?,
        ledger_total: row.try_get("ledger_total")?,
        shipment_count: row.try_get("shipment_count")?,
        total_shipped: row.try_get("total_shipped")?,
    })
}

pub(super) fn traceability_record(row: &PgRow) -> Result<TraceabilityRecord> {
    Ok(TraceabilityRecord {
        shipment_id: ShipmentId::new(row.try_get("shipment_id")?),
        shipment_date: row.try_get("shipment_date")?,
        airway_bill_no: row.try_get("airway_bill_no")?,
        shipment_status: status(row, "shipment_status")?,
        order_id: OrderId::new(row.try_get("order_id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        customer_name: row.try_get("customer_name")?,
        country_code: row.try_get("country_code")?,
        detail_id: ShipmentDetailId::new(row.try_get("detail_id")?),
        box_label_id: row.try_get("box_label_id")?,
        quantity_shipped: row.try_get("quantity_shipped")?,
        batch_cost_at_shipment: row.try_get("batch_cost_at_shipment")?,
        batch_id: BatchId::new(row.try_get("batch_id")?),
        species_name: row.try_get("species_name")?,
        birth_date: row.try_get("birth_date")?,
        farm_name: row.try_get("farm_name")?,
        tank_name: row.try_get("tank_name")?,
    })
}

pub(super) fn pricing_overview(row: &PgRow) -> Result<PricingOverview> {
    Ok(PricingOverview {
        batch_id: BatchId::new(row.try_get("batch_id")?),
        farm_id: FarmId::new(row.try_get("farm_id")?),
        farm_name: row.try_get("farm_name")?,
        species_id: SpeciesId::new(row.try_get("species_id")?),
        species: row.try_get("species")?,
        stage: row.try_get("stage")?,
        current_quantity: row.try_get("current_quantity")?,
        total_cost: row.try_get("total_cost")?,
        cost_per_unit: row.try_get("cost_per_unit")?,
        target_profit_margin: row.try_get("target_profit_margin")?,
        suggested_unit_price: row.try_get("suggested_unit_price")?,
    })
}

/// Reads a nullable numeric column produced by an aggregate or function call.
pub(super) fn optional_decimal(row: &PgRow, column: &str) -> Result<Option<Decimal>> {
    Ok(row.try_get(column)?)
}
