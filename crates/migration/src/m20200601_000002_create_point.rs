//! Create `points` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Point::Table)
                    .if_not_exists()
                    .col(pk_auto(Point::Id))
                    .col(string(Point::Image).not_null())
                    .col(string(Point::Name).not_null())
                    .col(string(Point::Email).not_null())
                    .col(string(Point::Whatsapp).not_null())
                    .col(double(Point::Latitude).not_null())
                    .col(double(Point::Longitude).not_null())
                    .col(string(Point::City).not_null())
                    .col(string_len(Point::Uf, 2).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Point::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Point {
    #[sea_orm(iden = "points")]
    Table,
    Id,
    Image,
    Name,
    Email,
    Whatsapp,
    Latitude,
    Longitude,
    City,
    Uf,
}
