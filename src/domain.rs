//! 领域数据结构
//!
//! 目录数据（游戏、分类、详情）、评分与用户身份。

pub mod game;
pub mod rating;
pub mod user;

pub use game::{Category, CategoryId, Game, GameDetails, GameId, NO_DESCRIPTION};
pub use rating::{Rating, RatingBucket, RatingDoc, StarFill};
pub use user::User;
