//! Seed the `items` catalog.
//! Image filenames match the icons `common::env::ensure_uploads_dir` installs.
use sea_orm_migration::prelude::*;

const ITEMS: [(&str, &str); 6] = [
    ("Lâmpadas", "lampadas.svg"),
    ("Pilhas e Baterias", "baterias.svg"),
    ("Papéis e Papelão", "papeis-papelao.svg"),
    ("Resíduos Eletrônicos", "eletronicos.svg"),
    ("Resíduos Orgânicos", "organicos.svg"),
    ("Óleo de Cozinha", "oleo.svg"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Item::Table).columns([Item::Title, Item::Image]);
        for (title, image) in ITEMS {
            insert.values_panic([title.into(), image.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let titles: Vec<&str> = ITEMS.iter().map(|(title, _)| *title).collect();
        let delete = Query::delete()
            .from_table(Item::Table)
            .and_where(Expr::col(Item::Title).is_in(titles))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}

#[derive(DeriveIden)]
enum Item {
    #[sea_orm(iden = "items")]
    Table,
    Title,
    Image,
}
