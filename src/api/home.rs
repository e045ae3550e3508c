use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiResponse, AppState, CapabilitiesDto, HomeDto, MetaDto, UserDto};

/// GET /home
/// Dashboard payload: who you are, what you may do, footer links
pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<HomeDto>> {
    let legal = &state.config().legal;

    Json(ApiResponse::success(HomeDto {
        user: UserDto::from(&user),
        capabilities: CapabilitiesDto::from(user.role),
        links: MetaDto {
            terms_of_service_url: legal.terms_of_service_url.clone(),
            privacy_policy_url: legal.privacy_policy_url.clone(),
        },
    }))
}

/// GET /meta
/// Public terms/privacy links for unauthenticated pages
pub async fn meta(State(state): State<Arc<AppState>>) -> Json<ApiResponse<MetaDto>> {
    let legal = &state.config().legal;

    Json(ApiResponse::success(MetaDto {
        terms_of_service_url: legal.terms_of_service_url.clone(),
        privacy_policy_url: legal.privacy_policy_url.clone(),
    }))
}
