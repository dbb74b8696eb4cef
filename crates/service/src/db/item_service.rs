use sea_orm::DatabaseConnection;
use serde::Serialize;

use models::item;
use crate::{errors::ServiceError, image_url::ImageUrls};

/// Catalog entry as served to the frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub id: i32,
    pub title: String,
    pub image_url: String,
}

/// List every item category, ordered by id.
pub async fn list_items(db: &DatabaseConnection, urls: &ImageUrls) -> Result<Vec<ItemView>, ServiceError> {
    let rows = item::list_all(db).await?;
    Ok(rows
        .into_iter()
        .map(|m| ItemView { id: m.id, image_url: urls.url_for(&m.image), title: m.title })
        .collect())
}
