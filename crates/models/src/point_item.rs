use sea_orm::{entity::prelude::*, PaginatorTrait, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, item, point};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub point_id: i32,
    pub item_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Point, Item }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Point => Entity::belongs_to(point::Entity)
                .from(Column::PointId)
                .to(point::Column::Id)
                .into(),
            Relation::Item => Entity::belongs_to(item::Entity)
                .from(Column::ItemId)
                .to(item::Column::Id)
                .into(),
        }
    }
}

impl Related<point::Entity> for Entity {
    fn to() -> RelationDef { Relation::Point.def() }
}

impl Related<item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Item.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert one association row per item id in a single statement.
pub async fn insert_batch<C: ConnectionTrait>(conn: &C, point_id: i32, item_ids: &[i32]) -> Result<usize, errors::ModelError> {
    if item_ids.is_empty() {
        return Ok(0);
    }
    let rows = item_ids.iter().map(|&item_id| ActiveModel {
        point_id: Set(point_id),
        item_id: Set(item_id),
        ..Default::default()
    });
    Entity::insert_many(rows)
        .exec(conn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(item_ids.len())
}

pub async fn count_for_point<C: ConnectionTrait>(conn: &C, point_id: i32) -> Result<u64, errors::ModelError> {
    Entity::find()
        .filter(Column::PointId.eq(point_id))
        .count(conn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
