//! 基线迁移：创建 documents 表
//!
//! 所有用户数据（library / favorites / ratings）共用一张文档表，
//! 以 (user_id, collection, doc_id) 作为联合主键，文档内容以 JSON 文本存储。

use log::info;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 幂等性检查：表已存在则跳过
        if manager.has_table("documents").await? {
            info!("[MIGRATION] documents table already exists, skipping");
            return Ok(());
        }

        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .col(ColumnDef::new(Documents::UserId).text().not_null())
                    .col(ColumnDef::new(Documents::Collection).text().not_null())
                    .col(ColumnDef::new(Documents::DocId).text().not_null())
                    .col(ColumnDef::new(Documents::Body).text().not_null())
                    .col(ColumnDef::new(Documents::UpdatedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Documents::UserId)
                            .col(Documents::Collection)
                            .col(Documents::DocId),
                    )
                    .to_owned(),
            )
            .await?;

        info!("[MIGRATION] documents table created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    UserId,
    Collection,
    DocId,
    Body,
    UpdatedAt,
}
