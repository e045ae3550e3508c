use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "password_reset_token")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Opaque random token handed out in the reset link
    #[sea_orm(unique)]
    pub token: String,

    pub user_id: i32,

    /// RFC 3339 expiry timestamp, 24 hours after issue
    pub expires_at: String,

    pub used: bool,

    pub created_at: String,

    pub updated_at: String,
}

impl Model {
    /// A token is valid iff it has not been used and has not expired.
    /// An unparseable expiry counts as expired.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.used {
            return false;
        }
        DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|expires_at| now < expires_at)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_user::Entity",
        from = "Column::UserId",
        to = "super::app_user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AppUser,
}

impl Related<super::app_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
