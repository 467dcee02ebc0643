use std::cmp::Reverse;

use async_trait::async_trait;
use common::{
    Customer, CustomerId, CustomerInput, Farm, FarmId, FarmInput, FarmPerformance, Species,
    SpeciesId, SpeciesInput, Tank, TankId, TankInput, mortality_rate,
};
use rust_decimal::Decimal;

use super::{
    InMemoryStore,
    tables::{TankRow, restricted},
};
use crate::{Result, StoreError, TankFilter, store::CatalogStore};

fn species_row(species_id: SpeciesId, input: SpeciesInput) -> Species {
    Species {
        species_id,
        common_name: input.common_name,
        scientific_name: input.scientific_name,
        description: input.description,
        target_profit_margin: input.target_profit_margin,
        ideal_temp_min: input.ideal_temp_min,
        ideal_temp_max: input.ideal_temp_max,
        ideal_ph_min: input.ideal_ph_min,
        ideal_ph_max: input.ideal_ph_max,
    }
}

fn farm_row(farm_id: FarmId, input: FarmInput) -> Farm {
    Farm {
        farm_id,
        farm_name: input.farm_name,
        location: input.location,
        license_number: input.license_number,
        manager_name: input.manager_name,
        phone: input.phone,
        total_capacity_liters: input.total_capacity_liters,
        established_date: input.established_date,
    }
}

fn customer_row(customer_id: CustomerId, input: CustomerInput) -> Customer {
    Customer {
        customer_id,
        company_name: input.company_name,
        contact_person: input.contact_person,
        contact_email: input.contact_email,
        phone: input.phone,
        address: input.address,
        country_code: input.country_code,
        import_license_no: input.import_license_no,
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_species(&self) -> Result<Vec<Species>> {
        Ok(self
            .read(|t| {
                let mut species: Vec<_> = t.species.values().cloned().collect();
                species.sort_by(|a, b| {
                    a.common_name
                        .cmp(&b.common_name)
                        .then(b.species_id.cmp(&a.species_id))
                });
                species
            })
            .await)
    }

    async fn get_species(&self, id: SpeciesId) -> Result<Option<Species>> {
        Ok(self.read(|t| t.species.get(&id).cloned()).await)
    }

    async fn create_species(&self, input: SpeciesInput) -> Result<Species> {
        self.write(|t| {
            let id = SpeciesId::new(t.next_id("species"));
            let species = species_row(id, input);
            t.species.insert(id, species.clone());
            Ok(species)
        })
        .await
    }

    async fn update_species(&self, id: SpeciesId, input: SpeciesInput) -> Result<Option<Species>> {
        self.write(|t| {
            let Some(existing) = t.species.get_mut(&id) else {
                return Ok(None);
            };
            *existing = species_row(id, input);
            Ok(Some(existing.clone()))
        })
        .await
    }

    async fn delete_species(&self, id: SpeciesId) -> Result<bool> {
        self.write(|t| {
            if !t.species.contains_key(&id) {
                return Ok(false);
            }
            if t.batches.values().any(|b| b.species_id == id) {
                return Err(restricted("species", "batch_species_id_fkey", "batch"));
            }
            if t.order_items.values().any(|i| i.species_id == id) {
                return Err(restricted(
                    "species",
                    "order_item_species_id_fkey",
                    "order_item",
                ));
            }
            t.species.remove(&id);
            Ok(true)
        })
        .await
    }

    async fn list_farms(&self) -> Result<Vec<Farm>> {
        Ok(self
            .read(|t| {
                let mut farms: Vec<_> = t.farms.values().cloned().collect();
                farms.sort_by(|a, b| {
                    a.farm_name
                        .cmp(&b.farm_name)
                        .then(b.farm_id.cmp(&a.farm_id))
                });
                farms
            })
            .await)
    }

    async fn get_farm(&self, id: FarmId) -> Result<Option<Farm>> {
        Ok(self.read(|t| t.farms.get(&id).cloned()).await)
    }

    async fn create_farm(&self, input: FarmInput) -> Result<Farm> {
        self.write(|t| {
            let id = FarmId::new(t.next_id("farm"));
            let farm = farm_row(id, input);
            t.farms.insert(id, farm.clone());
            Ok(farm)
        })
        .await
    }

    async fn update_farm(&self, id: FarmId, input: FarmInput) -> Result<Option<Farm>> {
        self.write(|t| {
            let Some(existing) = t.farms.get_mut(&id) else {
                return Ok(None);
            };
            *existing = farm_row(id, input);
            Ok(Some(existing.clone()))
        })
        .await
    }

    async fn delete_farm(&self, id: FarmId) -> Result<bool> {
        self.write(|t| {
            if !t.farms.contains_key(&id) {
                return Ok(false);
            }
            if t.tanks.values().any(|tank| tank.farm_id == id) {
                return Err(restricted("farm", "tank_farm_id_fkey", "tank"));
            }
            t.farms.remove(&id);
            Ok(true)
        })
        .await
    }

    async fn farm_performance(&self) -> Result<Vec<FarmPerformance>> {
        Ok(self
            .read(|t| {
                let mut rows: Vec<_> = t
                    .farms
                    .values()
                    .map(|farm| {
                        let tanks: Vec<TankId> = t
                            .tanks
                            .values()
                            .filter(|tank| tank.farm_id == farm.farm_id)
                            .map(|tank| tank.tank_id)
                            .collect();
                        let batches: Vec<_> = t
                            .batches
                            .values()
                            .filter(|b| tanks.contains(&b.tank_id))
                            .collect();

                        let initial_stock: i64 =
                            batches.iter().map(|b| i64::from(b.initial_quantity)).sum();
                        let current_stock: i64 =
                            batches.iter().map(|b| i64::from(b.current_quantity)).sum();
                        let total_cost: Decimal =
                            batches.iter().map(|b| t.ledger_total(b.batch_id)).sum();

                        FarmPerformance {
                            farm_id: farm.farm_id,
                            farm_name: farm.farm_name.clone(),
                            tank_count: tanks.len() as i64,
                            active_batches: batches
                                .iter()
                                .filter(|b| b.current_quantity > 0)
                                .count() as i64,
                            current_stock,
                            initial_stock,
                            mortality_rate: mortality_rate(initial_stock, current_stock),
                            total_cost,
                        }
                    })
                    .collect();
                rows.sort_by(|a, b| {
                    a.farm_name
                        .cmp(&b.farm_name)
                        .then(b.farm_id.cmp(&a.farm_id))
                });
                rows
            })
            .await)
    }

    async fn list_tanks(&self, filter: &TankFilter) -> Result<Vec<Tank>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut tanks: Vec<_> = t.tanks.values().filter_map(|r| t.tank_view(r)).collect();
                tanks.sort_by_key(|tank| {
                    (
                        tank.farm_name.clone(),
                        tank.tank_name.clone(),
                        Reverse(tank.tank_id),
                    )
                });
                query.apply(tanks)
            })
            .await)
    }

    async fn get_tank(&self, id: TankId) -> Result<Option<Tank>> {
        Ok(self
            .read(|t| t.tanks.get(&id).and_then(|r| t.tank_view(r)))
            .await)
    }

    async fn create_tank(&self, input: TankInput) -> Result<Tank> {
        self.write(|t| {
            t.require_farm(input.farm_id, "tank", "tank_farm_id_fkey")?;
            let tank_id = TankId::new(t.next_id("tank"));
            let row = TankRow {
                tank_id,
                farm_id: input.farm_id,
                tank_name: input.tank_name,
                tank_type: input.tank_type,
                volume_liters: input.volume_liters,
                is_active: input.is_active.unwrap_or(true),
            };
            let tank = t.tank_view(&row);
            t.tanks.insert(tank_id, row);
            tank.ok_or(StoreError::NotFound {
                entity: "farm",
                id: input.farm_id.as_i32(),
            })
        })
        .await
    }

    async fn update_tank(&self, id: TankId, input: TankInput) -> Result<Option<Tank>> {
        self.write(|t| {
            if !t.tanks.contains_key(&id) {
                return Ok(None);
            }
            t.require_farm(input.farm_id, "tank", "tank_farm_id_fkey")?;
            let Some(row) = t.tanks.get_mut(&id) else {
                return Ok(None);
            };
            row.farm_id = input.farm_id;
            row.tank_name = input.tank_name;
            row.tank_type = input.tank_type;
            row.volume_liters = input.volume_liters;
            if let Some(is_active) = input.is_active {
                row.is_active = is_active;
            }
            let row = row.clone();
            Ok(t.tank_view(&row))
        })
        .await
    }

    async fn delete_tank(&self, id: TankId) -> Result<bool> {
        self.write(|t| {
            if !t.tanks.contains_key(&id) {
                return Ok(false);
            }
            if t.batches.values().any(|b| b.tank_id == id) {
                return Err(restricted("tank", "batch_tank_id_fkey", "batch"));
            }
            t.cascade_tank(id);
            Ok(true)
        })
        .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self
            .read(|t| {
                let mut customers: Vec<_> = t.customers.values().cloned().collect();
                customers.sort_by(|a, b| {
                    a.company_name
                        .cmp(&b.company_name)
                        .then(b.customer_id.cmp(&a.customer_id))
                });
                customers
            })
            .await)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.read(|t| t.customers.get(&id).cloned()).await)
    }

    async fn create_customer(&self, input: CustomerInput) -> Result<Customer> {
        self.write(|t| {
            let id = CustomerId::new(t.next_id("customer"));
            let customer = customer_row(id, input);
            t.customers.insert(id, customer.clone());
            Ok(customer)
        })
        .await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Option<Customer>> {
        self.write(|t| {
            let Some(existing) = t.customers.get_mut(&id) else {
                return Ok(None);
            };
            *existing = customer_row(id, input);
            Ok(Some(existing.clone()))
        })
        .await
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool> {
        self.write(|t| {
            if !t.customers.contains_key(&id) {
                return Ok(false);
            }
            if t.orders.values().any(|o| o.customer_id == id) {
                return Err(restricted(
                    "customer",
                    "customer_order_customer_id_fkey",
                    "customer_order",
                ));
            }
            t.customers.remove(&id);
            Ok(true)
        })
        .await
    }
}
