use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::ReservationStatus;
use crate::entities::{equipment_reservation, prelude::*};

/// A reservation row joined with the name of the reserved equipment
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub user_id: i32,
    pub reservation_date: String,
    pub status: ReservationStatus,
    pub created_at: String,
}

pub struct ReservationRepository {
    conn: DatabaseConnection,
}

impl ReservationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_row(
        row: equipment_reservation::Model,
        related: Option<crate::entities::equipment::Model>,
    ) -> Reservation {
        Reservation {
            id: row.id,
            equipment_id: row.equipment_id,
            equipment_name: related.map_or_else(String::new, |e| e.name),
            user_id: row.user_id,
            reservation_date: row.reservation_date,
            status: ReservationStatus::parse(&row.status),
            created_at: row.created_at,
        }
    }

    /// All reservations for one user, newest date first
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Reservation>> {
        let rows = EquipmentReservation::find()
            .filter(equipment_reservation::Column::UserId.eq(user_id))
            .order_by_desc(equipment_reservation::Column::ReservationDate)
            .find_also_related(Equipment)
            .all(&self.conn)
            .await
            .context("Failed to list reservations for user")?;

        Ok(rows
            .into_iter()
            .map(|(row, related)| Self::map_row(row, related))
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Reservation>> {
        let row = EquipmentReservation::find_by_id(id)
            .find_also_related(Equipment)
            .one(&self.conn)
            .await
            .context("Failed to query reservation by ID")?;

        Ok(row.map(|(row, related)| Self::map_row(row, related)))
    }

    /// Availability check: true when no ACTIVE reservation exists for the
    /// (equipment, date) pair.
    pub async fn is_available(&self, equipment_id: i32, date: NaiveDate) -> Result<bool> {
        let count = EquipmentReservation::find()
            .filter(equipment_reservation::Column::EquipmentId.eq(equipment_id))
            .filter(equipment_reservation::Column::ReservationDate.eq(date.to_string()))
            .filter(equipment_reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .count(&self.conn)
            .await
            .context("Failed to count active reservations")?;

        Ok(count == 0)
    }

    pub async fn insert(&self, equipment_id: i32, user_id: i32, date: NaiveDate) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = equipment_reservation::ActiveModel {
            equipment_id: Set(equipment_id),
            user_id: Set(user_id),
            reservation_date: Set(date.to_string()),
            status: Set(ReservationStatus::Active.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert reservation")?;

        Ok(model.id)
    }

    /// Flip ACTIVE -> CANCELLED, but only when the reservation belongs to
    /// the given user and is currently active.
    pub async fn cancel(&self, id: i32, user_id: i32) -> Result<bool> {
        let row = EquipmentReservation::find()
            .filter(equipment_reservation::Column::Id.eq(id))
            .filter(equipment_reservation::Column::UserId.eq(user_id))
            .filter(equipment_reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query reservation for cancellation")?;

        let Some(row) = row else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: equipment_reservation::ActiveModel = row.into();
        active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(true)
    }
}
