use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Points: list filter on (city, uf)
        manager
            .create_index(
                Index::create()
                    .name("idx_points_city_uf")
                    .table(Point::Table)
                    .col(Point::City)
                    .col(Point::Uf)
                    .to_owned(),
            )
            .await?;

        // PointItems: lookups by item for listing, by point for show
        manager
            .create_index(
                Index::create()
                    .name("idx_point_items_item")
                    .table(PointItem::Table)
                    .col(PointItem::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_point_items_point")
                    .table(PointItem::Table)
                    .col(PointItem::PointId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_point_items_point").table(PointItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_point_items_item").table(PointItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_points_city_uf").table(Point::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Point {
    #[sea_orm(iden = "points")]
    Table,
    City,
    Uf,
}

#[derive(DeriveIden)]
enum PointItem {
    #[sea_orm(iden = "point_items")]
    Table,
    PointId,
    ItemId,
}
