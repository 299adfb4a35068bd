use crate::{
    dto::auth::UserList,
    error::AppResult,
    repository::UserRepository,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Full account listing for the admin dashboard.
pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let items = state.users.list_all().await?;
    Ok(ApiResponse::success(
        "Kullanıcılar",
        UserList { items },
        Some(Meta::empty()),
    ))
}
