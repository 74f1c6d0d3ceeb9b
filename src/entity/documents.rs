//! 用户文档实体
//!
//! documents 表以 (user_id, collection, doc_id) 为联合主键，
//! body 列保存文档的 JSON 文本。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub doc_id: String,

    /// 文档内容（JSON 文本）
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// 最后写入时间（Unix 秒）
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
