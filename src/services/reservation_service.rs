//! Domain service for per-day equipment reservations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::{Reservation, User};
use crate::services::notify::ClientInfo;

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("The selected equipment was not found")]
    EquipmentNotFound,

    #[error("The selected date is already reserved")]
    AlreadyReserved,

    /// The reservation does not exist, is not the caller's, or is not
    /// active. Deliberately undifferentiated.
    #[error("The reservation could not be cancelled")]
    CancelFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReservationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReservationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for reservations.
#[async_trait::async_trait]
pub trait ReservationService: Send + Sync {
    /// The caller's reservations, newest date first.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Reservation>, ReservationError>;

    /// Reserves equipment for one calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::AlreadyReserved`] when an ACTIVE
    /// reservation exists for the same (equipment, date) pair.
    async fn reserve(
        &self,
        user: &User,
        equipment_id: i32,
        date: NaiveDate,
        client: &ClientInfo,
    ) -> Result<i32, ReservationError>;

    /// Cancels a reservation owned by the caller.
    async fn cancel(&self, user_id: i32, reservation_id: i32) -> Result<(), ReservationError>;
}
