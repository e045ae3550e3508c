//! `SeaORM` implementation of the `ReservationService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{Reservation, Store, User};
use crate::services::notify::{ClientInfo, Notifier};
use crate::services::reservation_service::{ReservationError, ReservationService};

pub struct SeaOrmReservationService {
    store: Store,
    notifier: Arc<Notifier>,
}

impl SeaOrmReservationService {
    #[must_use]
    pub const fn new(store: Store, notifier: Arc<Notifier>) -> Self {
        Self { store, notifier }
    }
}

#[async_trait]
impl ReservationService for SeaOrmReservationService {
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Reservation>, ReservationError> {
        Ok(self.store.list_reservations_for_user(user_id).await?)
    }

    async fn reserve(
        &self,
        user: &User,
        equipment_id: i32,
        date: NaiveDate,
        client: &ClientInfo,
    ) -> Result<i32, ReservationError> {
        let equipment = self
            .store
            .get_equipment(equipment_id)
            .await?
            .ok_or(ReservationError::EquipmentNotFound)?;

        // Availability gate. This check-then-insert is not transactional and
        // there is no unique constraint backing it, so two concurrent
        // requests for the same slot can both pass the check. Kept as-is;
        // see DESIGN.md before closing the window.
        let available = self.store.is_equipment_available(equipment_id, date).await?;

        if !available {
            return Err(ReservationError::AlreadyReserved);
        }

        let id = self
            .store
            .insert_reservation(equipment_id, user.id, date)
            .await?;

        self.notifier
            .equipment_reserved(user, &equipment.name, &date.to_string(), client);

        Ok(id)
    }

    async fn cancel(&self, user_id: i32, reservation_id: i32) -> Result<(), ReservationError> {
        let cancelled = self.store.cancel_reservation(reservation_id, user_id).await?;

        if cancelled {
            Ok(())
        } else {
            Err(ReservationError::CancelFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SlackConfig, SmtpConfig};
    use crate::db::EquipmentInput;
    use crate::domain::{EquipmentCategory, ReservationStatus, Role};
    use crate::services::email::EmailService;
    use crate::services::slack::SlackService;
    use rust_decimal::Decimal;

    async fn test_service() -> (SeaOrmReservationService, Store) {
        let store = Store::new("sqlite::memory:").await.expect("store");
        let notifier = Arc::new(Notifier::new(
            Arc::new(EmailService::new(SmtpConfig::default())),
            Arc::new(SlackService::new(SlackConfig::default())),
            16,
        ));
        (
            SeaOrmReservationService::new(store.clone(), notifier),
            store,
        )
    }

    async fn seed_customer(store: &Store, username: &str) -> User {
        store
            .insert_user(
                username,
                &format!("{username}@example.com"),
                "secret123",
                Role::Customer,
            )
            .await
            .expect("insert user")
    }

    async fn seed_equipment(store: &Store, name: &str) -> i32 {
        store
            .insert_equipment(&EquipmentInput {
                name: name.to_string(),
                purchase_price: Decimal::new(19_800, 2),
                description: None,
                category: EquipmentCategory::Tools,
            })
            .await
            .expect("insert equipment")
            .id
    }

    #[tokio::test]
    async fn test_conflicting_reservation_is_rejected_until_cancelled() {
        let (service, store) = test_service().await;
        let client = ClientInfo::unknown();

        let alice = seed_customer(&store, "alice").await;
        let bob = seed_customer(&store, "bob").await;
        let equipment_id = seed_equipment(&store, "Soldering station").await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");

        let reservation_id = service
            .reserve(&alice, equipment_id, date, &client)
            .await
            .expect("first reservation");

        let conflict = service.reserve(&bob, equipment_id, date, &client).await;
        assert!(matches!(conflict, Err(ReservationError::AlreadyReserved)));

        service
            .cancel(alice.id, reservation_id)
            .await
            .expect("cancel");

        service
            .reserve(&bob, equipment_id, date, &client)
            .await
            .expect("reservation after cancellation");
    }

    #[tokio::test]
    async fn test_same_equipment_different_day_is_fine() {
        let (service, store) = test_service().await;
        let client = ClientInfo::unknown();

        let alice = seed_customer(&store, "alice").await;
        let bob = seed_customer(&store, "bob").await;
        let equipment_id = seed_equipment(&store, "Oscilloscope").await;

        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).expect("date");
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).expect("date");

        service
            .reserve(&alice, equipment_id, monday, &client)
            .await
            .expect("monday");
        service
            .reserve(&bob, equipment_id, tuesday, &client)
            .await
            .expect("tuesday");
    }

    #[tokio::test]
    async fn test_unknown_equipment_is_rejected() {
        let (service, store) = test_service().await;
        let client = ClientInfo::unknown();

        let alice = seed_customer(&store, "alice").await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");

        let result = service.reserve(&alice, 9999, date, &client).await;
        assert!(matches!(result, Err(ReservationError::EquipmentNotFound)));
    }

    #[tokio::test]
    async fn test_cancel_is_owner_scoped_and_single_shot() {
        let (service, store) = test_service().await;
        let client = ClientInfo::unknown();

        let alice = seed_customer(&store, "alice").await;
        let bob = seed_customer(&store, "bob").await;
        let equipment_id = seed_equipment(&store, "Label printer").await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");

        let reservation_id = service
            .reserve(&alice, equipment_id, date, &client)
            .await
            .expect("reserve");

        // Someone else's reservation cannot be cancelled
        let foreign = service.cancel(bob.id, reservation_id).await;
        assert!(matches!(foreign, Err(ReservationError::CancelFailed)));

        service
            .cancel(alice.id, reservation_id)
            .await
            .expect("owner cancel");

        // Already cancelled
        let again = service.cancel(alice.id, reservation_id).await;
        assert!(matches!(again, Err(ReservationError::CancelFailed)));

        let row = store
            .get_reservation(reservation_id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(row.status, ReservationStatus::Cancelled);
    }
}
