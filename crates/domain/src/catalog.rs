//! Reference data: species, farms, tanks and customers.

use common::{
    Customer, CustomerId, CustomerInput, Farm, FarmId, FarmInput, FarmPerformance, Species,
    SpeciesId, SpeciesInput, Tank, TankId, TankInput,
};
use store::{AquacultureStore, CatalogStore, TankFilter};

use crate::error::{DomainError, Result};
use crate::validate;

fn check_species(input: &SpeciesInput) -> Result<()> {
    validate::required("common_name", &input.common_name)?;
    validate::non_negative_amount("target_profit_margin", input.target_profit_margin)
}

fn check_tank(input: &TankInput) -> Result<()> {
    validate::required("tank_name", &input.tank_name)?;
    validate::non_negative_amount("volume_liters", input.volume_liters)
}

/// Service for the catalog entities every other record points at.
#[derive(Clone)]
pub struct CatalogService<S: AquacultureStore> {
    store: S,
}

impl<S: AquacultureStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_species(&self) -> Result<Vec<Species>> {
        Ok(self.store.list_species().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_species(&self, id: SpeciesId) -> Result<Option<Species>> {
        Ok(self.store.get_species(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_species(&self, input: SpeciesInput) -> Result<Species> {
        check_species(&input)?;
        Ok(self.store.create_species(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_species(&self, id: SpeciesId, input: SpeciesInput) -> Result<Species> {
        check_species(&input)?;
        self.store
            .update_species(id, input)
            .await?
            .ok_or(DomainError::not_found("Species", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_species(&self, id: SpeciesId) -> Result<()> {
        if !self.store.delete_species(id).await? {
            return Err(DomainError::not_found("Species", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_farms(&self) -> Result<Vec<Farm>> {
        Ok(self.store.list_farms().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_farm(&self, id: FarmId) -> Result<Option<Farm>> {
        Ok(self.store.get_farm(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_farm(&self, input: FarmInput) -> Result<Farm> {
        validate::required("farm_name", &input.farm_name)?;
        Ok(self.store.create_farm(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_farm(&self, id: FarmId, input: FarmInput) -> Result<Farm> {
        validate::required("farm_name", &input.farm_name)?;
        self.store
            .update_farm(id, input)
            .await?
            .ok_or(DomainError::not_found("Farm", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_farm(&self, id: FarmId) -> Result<()> {
        if !self.store.delete_farm(id).await? {
            return Err(DomainError::not_found("Farm", id));
        }
        Ok(())
    }

    /// Stock, mortality and cost totals per farm.
    #[tracing::instrument(skip(self))]
    pub async fn farm_performance(&self) -> Result<Vec<FarmPerformance>> {
        Ok(self.store.farm_performance().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_tanks(&self, filter: TankFilter) -> Result<Vec<Tank>> {
        Ok(self.store.list_tanks(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_tank(&self, id: TankId) -> Result<Option<Tank>> {
        Ok(self.store.get_tank(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_tank(&self, input: TankInput) -> Result<Tank> {
        check_tank(&input)?;
        Ok(self.store.create_tank(input).await?)
    }

    /// Replaces a tank. An omitted `is_active` keeps the stored flag.
    #[tracing::instrument(skip(self))]
    pub async fn update_tank(&self, id: TankId, input: TankInput) -> Result<Tank> {
        check_tank(&input)?;
        self.store
            .update_tank(id, input)
            .await?
            .ok_or(DomainError::not_found("Tank", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_tank(&self, id: TankId) -> Result<()> {
        if !self.store.delete_tank(id).await? {
            return Err(DomainError::not_found("Tank", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.store.list_customers().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.store.get_customer(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_customer(&self, input: CustomerInput) -> Result<Customer> {
        validate::required("company_name", &input.company_name)?;
        Ok(self.store.create_customer(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_customer(&self, id: CustomerId, input: CustomerInput) -> Result<Customer> {
        validate::required("company_name", &input.company_name)?;
        self.store
            .update_customer(id, input)
            .await?
            .ok_or(DomainError::not_found("Customer", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        if !self.store.delete_customer(id).await? {
            return Err(DomainError::not_found("Customer", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use store::{InMemoryStore, StoreError};

    use super::*;

    fn service() -> CatalogService<InMemoryStore> {
        CatalogService::new(InMemoryStore::new())
    }

    #[tokio::test]
    async fn species_name_is_required() {
        let service = service();
        let err = service
            .create_species(SpeciesInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(service.list_species().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updating_a_missing_farm_is_not_found() {
        let err = service()
            .update_farm(
                FarmId::new(3),
                FarmInput {
                    farm_name: "North".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Farm not found");
    }

    #[tokio::test]
    async fn farm_with_tanks_cannot_be_deleted() {
        let service = service();
        let farm = service
            .create_farm(FarmInput {
                farm_name: "North".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let tank = service
            .create_tank(TankInput {
                farm_id: farm.farm_id,
                tank_name: "N-1".to_string(),
                tank_type: None,
                volume_liters: None,
                is_active: Some(false),
            })
            .await
            .unwrap();
        assert!(!tank.is_active);
        assert_eq!(tank.farm_name, "North");

        let err = service.delete_farm(farm.farm_id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Store(StoreError::ConstraintViolation { .. })
        ));

        service.delete_tank(tank.tank_id).await.unwrap();
        service.delete_farm(farm.farm_id).await.unwrap();
        assert!(service.get_farm(farm.farm_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tank_update_keeps_active_flag_when_omitted() {
        let service = service();
        let farm = service
            .create_farm(FarmInput {
                farm_name: "South".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let tank = service
            .create_tank(TankInput {
                farm_id: farm.farm_id,
                tank_name: "S-1".to_string(),
                tank_type: None,
                volume_liters: None,
                is_active: Some(false),
            })
            .await
            .unwrap();

        let updated = service
            .update_tank(
                tank.tank_id,
                TankInput {
                    farm_id: farm.farm_id,
                    tank_name: "S-1b".to_string(),
                    tank_type: Some("raceway".to_string()),
                    volume_liters: None,
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.tank_name, "S-1b");
        assert!(!updated.is_active);
    }
}
