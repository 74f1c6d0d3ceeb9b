//! 数据实体模块
//!
//! SeaORM 实体定义。

pub mod prelude;

// === SeaORM 实体（对应数据库表）===
pub mod documents;
