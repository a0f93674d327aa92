use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Annotations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Annotations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Annotations::Label).string().not_null())
                    .col(ColumnDef::new(Annotations::X).double().not_null())
                    .col(ColumnDef::new(Annotations::Y).double().not_null())
                    .col(ColumnDef::new(Annotations::Width).double().not_null())
                    .col(ColumnDef::new(Annotations::Height).double().not_null())
                    .col(ColumnDef::new(Annotations::ImageId).uuid().not_null())
                    .col(ColumnDef::new(Annotations::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_annotations_image_id")
                            .from(Annotations::Table, Annotations::ImageId)
                            .to(Images::Table, Images::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_annotations_image_id")
                    .table(Annotations::Table)
                    .col(Annotations::ImageId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Annotations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Annotations {
    Table,
    Id,
    Label,
    X,
    Y,
    Width,
    Height,
    ImageId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Images {
    Table,
    Id,
}
