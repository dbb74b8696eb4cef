use sea_orm::{entity::prelude::*, JoinType, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, point_item};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub image: String,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
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

/// Attributes of a point before the store assigns its id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPoint {
    pub image: String,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
}

pub async fn insert<C: ConnectionTrait>(conn: &C, new: NewPoint) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        image: Set(new.image),
        name: Set(new.name),
        email: Set(new.email),
        whatsapp: Set(new.whatsapp),
        latitude: Set(new.latitude),
        longitude: Set(new.longitude),
        city: Set(new.city),
        uf: Set(new.uf),
        ..Default::default()
    };
    am.insert(conn).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(conn).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Distinct points in `city`/`uf` linked to at least one of `item_ids`.
pub async fn find_by_city_uf_items<C: ConnectionTrait>(
    conn: &C,
    city: &str,
    uf: &str,
    item_ids: &[i32],
) -> Result<Vec<Model>, errors::ModelError> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    Entity::find()
        .join(JoinType::InnerJoin, Relation::PointItem.def())
        .filter(point_item::Column::ItemId.is_in(item_ids.iter().copied()))
        .filter(Column::City.eq(city))
        .filter(Column::Uf.eq(uf))
        .distinct()
        .all(conn)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
