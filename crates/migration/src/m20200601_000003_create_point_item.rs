//! Create `point_items` join table.
//! Both foreign keys are enforced so no association can reference a missing point or item.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointItem::Table)
                    .if_not_exists()
                    .col(pk_auto(PointItem::Id))
                    .col(integer(PointItem::PointId).not_null())
                    .col(integer(PointItem::ItemId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_items_point")
                            .from(PointItem::Table, PointItem::PointId)
                            .to(Point::Table, Point::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_items_item")
                            .from(PointItem::Table, PointItem::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PointItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PointItem {
    #[sea_orm(iden = "point_items")]
    Table,
    Id,
    PointId,
    ItemId,
}

#[derive(DeriveIden)]
enum Point {
    #[sea_orm(iden = "points")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Item {
    #[sea_orm(iden = "items")]
    Table,
    Id,
}
