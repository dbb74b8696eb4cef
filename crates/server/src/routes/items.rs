use axum::{extract::State, Json};
use service::db::item_service::{self, ItemView};
use tracing::info;

use crate::{errors::JsonApiError, routes::ServerState};

#[utoipa::path(
    get, path = "/items", tag = "items",
    responses(
        (status = 200, description = "Item catalog", body = [crate::openapi::ItemDoc]),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ItemView>>, JsonApiError> {
    let items = item_service::list_items(&state.db, state.points.urls()).await?;
    info!(count = items.len(), "list items");
    Ok(Json(items))
}
