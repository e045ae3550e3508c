use serde::Serialize;

use crate::db::{Reservation, User};
use crate::domain::Role;
use crate::entities::equipment;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EquipmentDto {
    pub id: i32,
    pub name: String,
    /// Decimal rendered as a string to avoid float rounding on the wire
    pub purchase_price: String,
    pub description: Option<String>,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<equipment::Model> for EquipmentDto {
    fn from(model: equipment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            purchase_price: model.purchase_price.to_string(),
            description: model.description,
            category: model.category,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationDto {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub reservation_date: String,
    pub status: String,
    pub created_at: String,
}

impl From<Reservation> for ReservationDto {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            equipment_id: reservation.equipment_id,
            equipment_name: reservation.equipment_name,
            reservation_date: reservation.reservation_date,
            status: reservation.status.as_str().to_string(),
            created_at: reservation.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesDto {
    pub can_manage_users: bool,
    pub can_create_staff: bool,
    pub can_manage_equipment: bool,
    pub can_reserve_equipment: bool,
}

impl From<Role> for CapabilitiesDto {
    fn from(role: Role) -> Self {
        Self {
            can_manage_users: role.can_manage_users(),
            can_create_staff: role.can_create_staff(),
            can_manage_equipment: role.can_manage_equipment(),
            can_reserve_equipment: role.can_reserve_equipment(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetaDto {
    pub terms_of_service_url: Option<String>,
    pub privacy_policy_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HomeDto {
    pub user: UserDto,
    pub capabilities: CapabilitiesDto,
    pub links: MetaDto,
}

#[derive(Debug, Serialize)]
pub struct TokenStatusDto {
    pub valid: bool,
}
