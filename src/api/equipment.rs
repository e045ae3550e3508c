use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, client_info};
use super::{ApiError, ApiResponse, AppState, EquipmentDto, MessageResponse, require_capability};
use crate::api::validation;
use crate::db::EquipmentInput;
use crate::domain::{Capability, EquipmentCategory};

#[derive(Deserialize)]
pub struct EquipmentRequest {
    pub name: String,
    /// Decimal string; validated non-negative
    pub purchase_price: String,
    pub description: Option<String>,
    /// Unknown categories coerce to OTHER
    pub category: Option<String>,
}

impl EquipmentRequest {
    fn validate(&self) -> Result<EquipmentInput, ApiError> {
        let name = validation::validate_equipment_name(&self.name)?;
        let purchase_price = validation::validate_price(&self.purchase_price)?;
        let description = validation::validate_description(self.description.as_deref())?;
        let category = self
            .category
            .as_deref()
            .map_or(EquipmentCategory::Other, EquipmentCategory::parse);

        Ok(EquipmentInput {
            name: name.to_string(),
            purchase_price,
            description,
            category,
        })
    }
}

/// GET /equipment
/// Inventory listing; customers need it to pick what to reserve
pub async fn list_equipment(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<EquipmentDto>>>, ApiError> {
    let items = state.store().list_equipment().await?;

    Ok(Json(ApiResponse::success(
        items.into_iter().map(EquipmentDto::from).collect(),
    )))
}

/// GET /equipment/categories
/// The closed category enumeration offered by the inventory form
pub async fn list_categories() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(
        EquipmentCategory::ALL
            .iter()
            .map(|category| category.as_str())
            .collect(),
    ))
}

/// GET /equipment/{id}
pub async fn get_equipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EquipmentDto>>, ApiError> {
    let item = state
        .store()
        .get_equipment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Equipment", id))?;

    Ok(Json(ApiResponse::success(EquipmentDto::from(item))))
}

/// POST /equipment
/// Staff/admin only
pub async fn create_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<EquipmentRequest>,
) -> Result<Json<ApiResponse<EquipmentDto>>, ApiError> {
    require_capability(&user, Capability::ManageEquipment)?;

    let input = payload.validate()?;
    let item = state.store().insert_equipment(&input).await?;

    state
        .notifier()
        .equipment_operation(&user, &item.name, "created", &client_info(&headers));

    Ok(Json(ApiResponse::success(EquipmentDto::from(item))))
}

/// PUT /equipment/{id}
/// Staff/admin only
pub async fn update_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<EquipmentRequest>,
) -> Result<Json<ApiResponse<EquipmentDto>>, ApiError> {
    require_capability(&user, Capability::ManageEquipment)?;

    let input = payload.validate()?;
    let item = state
        .store()
        .update_equipment(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Equipment", id))?;

    state
        .notifier()
        .equipment_operation(&user, &item.name, "updated", &client_info(&headers));

    Ok(Json(ApiResponse::success(EquipmentDto::from(item))))
}

/// DELETE /equipment/{id}
/// Staff/admin only
pub async fn delete_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_capability(&user, Capability::ManageEquipment)?;

    let item = state
        .store()
        .get_equipment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Equipment", id))?;

    if !state.store().remove_equipment(id).await? {
        return Err(ApiError::not_found("Equipment", id));
    }

    state
        .notifier()
        .equipment_operation(&user, &item.name, "deleted", &client_info(&headers));

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Equipment deleted",
    ))))
}
