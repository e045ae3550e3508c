use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::Role;
use crate::entities::{equipment, password_reset_token};

pub mod migrator;
pub mod repositories;

pub use repositories::equipment::EquipmentInput;
pub use repositories::reservation::Reservation;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn equipment_repo(&self) -> repositories::equipment::EquipmentRepository {
        repositories::equipment::EquipmentRepository::new(self.conn.clone())
    }

    fn reservation_repo(&self) -> repositories::reservation::ReservationRepository {
        repositories::reservation::ReservationRepository::new(self.conn.clone())
    }

    fn reset_token_repo(&self) -> repositories::reset_token::ResetTokenRepository {
        repositories::reset_token::ResetTokenRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn user_exists_by_username(&self, username: &str) -> Result<bool> {
        self.user_repo().exists_by_username(username).await
    }

    pub async fn user_exists_by_email(&self, email: &str) -> Result<bool> {
        self.user_repo().exists_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User> {
        self.user_repo()
            .insert(username, email, password, role)
            .await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(&self, user_id: i32, new_password: &str) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password)
            .await
    }

    // ========== Equipment ==========

    pub async fn list_equipment(&self) -> Result<Vec<equipment::Model>> {
        self.equipment_repo().list_all().await
    }

    pub async fn get_equipment(&self, id: i32) -> Result<Option<equipment::Model>> {
        self.equipment_repo().get(id).await
    }

    pub async fn insert_equipment(&self, input: &EquipmentInput) -> Result<equipment::Model> {
        self.equipment_repo().insert(input).await
    }

    pub async fn update_equipment(
        &self,
        id: i32,
        input: &EquipmentInput,
    ) -> Result<Option<equipment::Model>> {
        self.equipment_repo().update(id, input).await
    }

    pub async fn remove_equipment(&self, id: i32) -> Result<bool> {
        self.equipment_repo().remove(id).await
    }

    // ========== Reservations ==========

    pub async fn list_reservations_for_user(&self, user_id: i32) -> Result<Vec<Reservation>> {
        self.reservation_repo().list_for_user(user_id).await
    }

    pub async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>> {
        self.reservation_repo().get(id).await
    }

    pub async fn is_equipment_available(&self, equipment_id: i32, date: NaiveDate) -> Result<bool> {
        self.reservation_repo()
            .is_available(equipment_id, date)
            .await
    }

    pub async fn insert_reservation(
        &self,
        equipment_id: i32,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<i32> {
        self.reservation_repo()
            .insert(equipment_id, user_id, date)
            .await
    }

    pub async fn cancel_reservation(&self, id: i32, user_id: i32) -> Result<bool> {
        self.reservation_repo().cancel(id, user_id).await
    }

    // ========== Password reset tokens ==========

    pub async fn mint_reset_token(&self, user_id: i32) -> Result<password_reset_token::Model> {
        self.reset_token_repo().mint(user_id).await
    }

    pub async fn find_unused_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<password_reset_token::Model>> {
        self.reset_token_repo().find_unused(token).await
    }

    pub async fn mark_reset_token_used(&self, token: password_reset_token::Model) -> Result<()> {
        self.reset_token_repo().mark_used(token).await
    }

    pub async fn invalidate_reset_tokens_for_user(&self, user_id: i32) -> Result<u64> {
        self.reset_token_repo().invalidate_for_user(user_id).await
    }

    pub async fn delete_expired_reset_tokens(&self) -> Result<u64> {
        self.reset_token_repo().delete_expired().await
    }
}
