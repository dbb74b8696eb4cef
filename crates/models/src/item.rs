use sea_orm::{entity::prelude::*, JoinType, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::{errors, point_item};

/// Recyclable material category. Seeded by migration, read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub image: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { PointItem }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PointItem => Entity::has_many(point_item::Entity).into(),
        }
    }
}

impl Related<point_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::PointItem.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Titles of the items linked to `point_id`, in item id order.
pub async fn titles_for_point<C: ConnectionTrait>(conn: &C, point_id: i32) -> Result<Vec<String>, errors::ModelError> {
    let rows = Entity::find()
        .join(JoinType::InnerJoin, Relation::PointItem.def())
        .filter(point_item::Column::PointId.eq(point_id))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(|m| m.title).collect())
}
