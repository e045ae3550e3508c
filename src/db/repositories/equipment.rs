use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::EquipmentCategory;
use crate::entities::{equipment, prelude::*};

/// Fields accepted when creating or updating an inventory item
#[derive(Debug, Clone)]
pub struct EquipmentInput {
    pub name: String,
    pub purchase_price: Decimal,
    pub description: Option<String>,
    pub category: EquipmentCategory,
}

pub struct EquipmentRepository {
    conn: DatabaseConnection,
}

impl EquipmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<equipment::Model>> {
        let rows = Equipment::find()
            .order_by_asc(equipment::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list equipment")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<equipment::Model>> {
        let row = Equipment::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query equipment by ID")?;

        Ok(row)
    }

    pub async fn insert(&self, input: &EquipmentInput) -> Result<equipment::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = equipment::ActiveModel {
            name: Set(input.name.clone()),
            purchase_price: Set(input.purchase_price),
            description: Set(input.description.clone()),
            category: Set(input.category.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert equipment")?;

        Ok(model)
    }

    pub async fn update(&self, id: i32, input: &EquipmentInput) -> Result<Option<equipment::Model>> {
        let Some(existing) = Equipment::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query equipment for update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: equipment::ActiveModel = existing.into();
        active.name = Set(input.name.clone());
        active.purchase_price = Set(input.purchase_price);
        active.description = Set(input.description.clone());
        active.category = Set(input.category.as_str().to_string());
        active.updated_at = Set(now);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update equipment")?;

        Ok(Some(model))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Equipment::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete equipment")?;

        Ok(result.rows_affected > 0)
    }
}
