//! 用户文档仓库
//!
//! 对 documents 表的 CRUD 操作，body 在这一层仍是 JSON 文本。

use crate::entity::documents;
use crate::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

pub struct DocumentsRepository;

impl DocumentsRepository {
    /// 按主键查询单条文档
    pub async fn find(
        db: &DatabaseConnection,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<documents::Model>, DbErr> {
        Documents::find_by_id((
            user_id.to_string(),
            collection.to_string(),
            doc_id.to_string(),
        ))
        .one(db)
        .await
    }

    /// 查询集合内全部文档，按 doc_id 排序
    pub async fn find_all_in_collection(
        db: &DatabaseConnection,
        user_id: &str,
        collection: &str,
    ) -> Result<Vec<documents::Model>, DbErr> {
        Documents::find()
            .filter(documents::Column::UserId.eq(user_id))
            .filter(documents::Column::Collection.eq(collection))
            .order_by_asc(documents::Column::DocId)
            .all(db)
            .await
    }

    /// 写入文档，已存在时整体覆盖 body
    pub async fn upsert(
        db: &DatabaseConnection,
        user_id: &str,
        collection: &str,
        doc_id: &str,
        body: String,
    ) -> Result<(), DbErr> {
        let now = chrono::Utc::now().timestamp();

        let doc = documents::ActiveModel {
            user_id: Set(user_id.to_string()),
            collection: Set(collection.to_string()),
            doc_id: Set(doc_id.to_string()),
            body: Set(body),
            updated_at: Set(now),
        };

        Documents::insert(doc)
            .on_conflict(
                OnConflict::columns([
                    documents::Column::UserId,
                    documents::Column::Collection,
                    documents::Column::DocId,
                ])
                .update_columns([documents::Column::Body, documents::Column::UpdatedAt])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Ok(())
    }

    /// 删除文档，返回删除的行数
    pub async fn delete(
        db: &DatabaseConnection,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<u64, DbErr> {
        Documents::delete_by_id((
            user_id.to_string(),
            collection.to_string(),
            doc_id.to_string(),
        ))
        .exec(db)
        .await
        .map(|result| result.rows_affected)
    }

    /// 统计集合内文档数量
    pub async fn count_in_collection(
        db: &DatabaseConnection,
        user_id: &str,
        collection: &str,
    ) -> Result<u64, DbErr> {
        Documents::find()
            .filter(documents::Column::UserId.eq(user_id))
            .filter(documents::Column::Collection.eq(collection))
            .count(db)
            .await
    }
}
