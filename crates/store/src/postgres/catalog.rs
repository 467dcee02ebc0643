use async_trait::async_trait;
use common::{
    Customer, CustomerId, CustomerInput, Farm, FarmId, FarmInput, FarmPerformance, Species,
    SpeciesId, SpeciesInput, Tank, TankId, TankInput,
};

use super::{PostgresStore, rows};
use crate::{Result, TankFilter, store::CatalogStore};

fn tank_select(source: &str) -> String {
    format!(
        "SELECT t.tank_id, t.farm_id, t.tank_name, t.tank_type, t.volume_liters, t.is_active, \
         f.farm_name \
         FROM {source} t JOIN farm f ON f.farm_id = t.farm_id"
    )
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_species(&self) -> Result<Vec<Species>> {
        self.fetch_all(
            "SELECT * FROM species ORDER BY common_name, species_id DESC",
            rows::species,
        )
        .await
    }

    async fn get_species(&self, id: SpeciesId) -> Result<Option<Species>> {
        self.fetch_by_id(
            "SELECT * FROM species WHERE species_id = $1",
            id.as_i32(),
            rows::species,
        )
        .await
    }

    async fn create_species(&self, input: SpeciesInput) -> Result<Species> {
        let row = sqlx::query(
            r#"
            INSERT INTO species (common_name, scientific_name, description, target_profit_margin,
                                 ideal_temp_min, ideal_temp_max, ideal_ph_min, ideal_ph_max)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.common_name)
        .bind(&input.scientific_name)
        .bind(&input.description)
        .bind(input.target_profit_margin)
        .bind(input.ideal_temp_min)
        .bind(input.ideal_temp_max)
        .bind(input.ideal_ph_min)
        .bind(input.ideal_ph_max)
        .fetch_one(&self.pool)
        .await?;

        rows::species(&row)
    }

    async fn update_species(&self, id: SpeciesId, input: SpeciesInput) -> Result<Option<Species>> {
        let row = sqlx::query(
            r#"
            UPDATE species
               SET common_name = $2, scientific_name = $3, description = $4,
                   target_profit_margin = $5, ideal_temp_min = $6, ideal_temp_max = $7,
                   ideal_ph_min = $8, ideal_ph_max = $9
             WHERE species_id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i32())
        .bind(&input.common_name)
        .bind(&input.scientific_name)
        .bind(&input.description)
        .bind(input.target_profit_margin)
        .bind(input.ideal_temp_min)
        .bind(input.ideal_temp_max)
        .bind(input.ideal_ph_min)
        .bind(input.ideal_ph_max)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rows::species).transpose()
    }

    async fn delete_species(&self, id: SpeciesId) -> Result<bool> {
        self.delete_by_id("DELETE FROM species WHERE species_id = $1", id.as_i32())
            .await
    }

    async fn list_farms(&self) -> Result<Vec<Farm>> {
        self.fetch_all(
            "SELECT * FROM farm ORDER BY farm_name, farm_id DESC",
            rows::farm,
        )
        .await
    }

    async fn get_farm(&self, id: FarmId) -> Result<Option<Farm>> {
        self.fetch_by_id(
            "SELECT * FROM farm WHERE farm_id = $1",
            id.as_i32(),
            rows::farm,
        )
        .await
    }

    async fn create_farm(&self, input: FarmInput) -> Result<Farm> {
        let row = sqlx::query(
            r#"
            INSERT INTO farm (farm_name, location, license_number, manager_name, phone,
                              total_capacity_liters, established_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.farm_name)
        .bind(&input.location)
        .bind(&input.license_number)
        .bind(&input.manager_name)
        .bind(&input.phone)
        .bind(input.total_capacity_liters)
        .bind(input.established_date)
        .fetch_one(&self.pool)
        .await?;

        rows::farm(&row)
    }

    async fn update_farm(&self, id: FarmId, input: FarmInput) -> Result<Option<Farm>> {
        let row = sqlx::query(
            r#"
            UPDATE farm
               SET farm_name = $2, location = $3, license_number = $4, manager_name = $5,
                   phone = $6, total_capacity_liters = $7, established_date = $8
             WHERE farm_id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i32())
        .bind(&input.farm_name)
        .bind(&input.location)
        .bind(&input.license_number)
        .bind(&input.manager_name)
        .bind(&input.phone)
        .bind(input.total_capacity_liters)
        .bind(input.established_date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rows::farm).transpose()
    }

    async fn delete_farm(&self, id: FarmId) -> Result<bool> {
        self.delete_by_id("DELETE FROM farm WHERE farm_id = $1", id.as_i32())
            .await
    }

    async fn farm_performance(&self) -> Result<Vec<FarmPerformance>> {
        self.fetch_all(
            "SELECT * FROM v_farm_performance_summary ORDER BY farm_name, farm_id DESC",
            rows::farm_performance,
        )
        .await
    }

    async fn list_tanks(&self, filter: &TankFilter) -> Result<Vec<Tank>> {
        self.fetch_list(
            &tank_select("tank"),
            "farm_name, tank_name, tank_id DESC",
            &filter.to_query(),
            rows::tank,
        )
        .await
    }

    async fn get_tank(&self, id: TankId) -> Result<Option<Tank>> {
        let sql = format!("{} WHERE t.tank_id = $1", tank_select("tank"));
        self.fetch_by_id(&sql, id.as_i32(), rows::tank).await
    }

    async fn create_tank(&self, input: TankInput) -> Result<Tank> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO tank (farm_id, tank_name, tank_type, volume_liters, is_active)
                VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
                RETURNING *
            ) {}",
            tank_select("inserted")
        );
        let row = sqlx::query(&sql)
            .bind(input.farm_id.as_i32())
            .bind(&input.tank_name)
            .bind(&input.tank_type)
            .bind(input.volume_liters)
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await?;

        rows::tank(&row)
    }

    async fn update_tank(&self, id: TankId, input: TankInput) -> Result<Option<Tank>> {
        let sql = format!(
            "WITH updated AS (
                UPDATE tank
                   SET farm_id = $2, tank_name = $3, tank_type = $4, volume_liters = $5,
                       is_active = COALESCE($6, is_active)
                 WHERE tank_id = $1
                RETURNING *
            ) {}",
            tank_select("updated")
        );
        let row = sqlx::query(&sql)
            .bind(id.as_i32())
            .bind(input.farm_id.as_i32())
            .bind(&input.tank_name)
            .bind(&input.tank_type)
            .bind(input.volume_liters)
            .bind(input.is_active)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rows::tank).transpose()
    }

    async fn delete_tank(&self, id: TankId) -> Result<bool> {
        self.delete_by_id("DELETE FROM tank WHERE tank_id = $1", id.as_i32())
            .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.fetch_all(
            "SELECT * FROM customer ORDER BY company_name, customer_id DESC",
            rows::customer,
        )
        .await
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        self.fetch_by_id(
            "SELECT * FROM customer WHERE customer_id = $1",
            id.as_i32(),
            rows::customer,
        )
        .await
    }

    async fn create_customer(&self, input: CustomerInput) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customer (company_name, contact_person, contact_email, phone, address,
                                  country_code, import_license_no)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.company_name)
        .bind(&input.contact_person)
        .bind(&input.contact_email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.country_code)
        .bind(&input.import_license_no)
        .fetch_one(&self.pool)
        .await?;

        rows::customer(&row)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            UPDATE customer
               SET company_name = $2, contact_person = $3, contact_email = $4, phone = $5,
                   address = $6, country_code = $7, import_license_no = $8
             WHERE customer_id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i32())
        .bind(&input.company_name)
        .bind(&input.contact_person)
        .bind(&input.contact_email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.country_code)
        .bind(&input.import_license_no)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rows::customer).transpose()
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool> {
        self.delete_by_id("DELETE FROM customer WHERE customer_id = $1", id.as_i32())
            .await
    }
}
