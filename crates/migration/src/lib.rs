//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied after tables; the item seed runs last.
pub use sea_orm_migration::prelude::*;

mod m20200601_000001_create_item;
mod m20200601_000002_create_point;
mod m20200601_000003_create_point_item;
mod m20200601_000004_add_indexes;
mod m20200601_000005_seed_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20200601_000001_create_item::Migration),
            Box::new(m20200601_000002_create_point::Migration),
            Box::new(m20200601_000003_create_point_item::Migration),
            Box::new(m20200601_000004_add_indexes::Migration),
            Box::new(m20200601_000005_seed_items::Migration),
        ]
    }
}
