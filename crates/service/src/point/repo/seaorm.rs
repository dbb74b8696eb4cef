use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use models::{item, point, point_item};

use crate::errors::ServiceError;
use crate::point::domain::ItemSelection;
use crate::point::repository::PointRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmPointRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPointRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl PointRepository for SeaOrmPointRepository {
    async fn list_filtered(&self, city: &str, uf: &str, item_ids: &[i32]) -> Result<Vec<point::Model>, ServiceError> {
        Ok(point::find_by_city_uf_items(&self.db, city, uf, item_ids).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<point::Model>, ServiceError> {
        Ok(point::find(&self.db, id).await?)
    }

    async fn item_titles(&self, point_id: i32) -> Result<Vec<String>, ServiceError> {
        Ok(item::titles_for_point(&self.db, point_id).await?)
    }

    async fn create_with_items(&self, new: point::NewPoint, items: &ItemSelection) -> Result<point::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| ServiceError::TransactionFailure(e.to_string()))?;
        match insert_point_with_items(&txn, new, items).await {
            Ok(created) => {
                txn.commit().await.map_err(|e| ServiceError::TransactionFailure(e.to_string()))?;
                Ok(created)
            }
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    warn!(error = %rb, "point_create_rollback_failed");
                }
                Err(e)
            }
        }
    }
}

/// Body of the create transaction. Every error here leaves `txn` to be rolled back.
async fn insert_point_with_items(
    txn: &DatabaseTransaction,
    new: point::NewPoint,
    items: &ItemSelection,
) -> Result<point::Model, ServiceError> {
    let created = point::insert(txn, new)
        .await
        .map_err(|e| ServiceError::TransactionFailure(e.to_string()))?;
    debug!(point_id = created.id, "point_row_inserted");

    // 非数字的 item id 无法建立关联，整笔事务作废
    if items.has_unparsable() {
        return Err(ServiceError::TransactionFailure("item list contains a non-numeric id".into()));
    }

    let ids = items.matchable_ids();
    let linked = point_item::insert_batch(txn, created.id, &ids)
        .await
        .map_err(|e| ServiceError::TransactionFailure(e.to_string()))?;
    debug!(point_id = created.id, linked, "point_items_inserted");
    Ok(created)
}
