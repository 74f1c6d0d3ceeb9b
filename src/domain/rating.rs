//! 星级评分
//!
//! 用户评分取值 0.5–5，步长为半星；存储格式为 `{ "rating": number }`。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 星级数量
pub const MAX_STARS: usize = 5;

/// 经过校验的用户评分
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Rating(f64);

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("rating must be between 0.5 and 5 in half-star steps, got {0}")]
pub struct InvalidRating(pub f64);

impl Rating {
    pub fn new(value: f64) -> Result<Self, InvalidRating> {
        let doubled = value * 2.0;
        if !value.is_finite() || !(0.5..=5.0).contains(&value) || doubled.fract() != 0.0 {
            return Err(InvalidRating(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// 向下取整后的整星数
    pub fn whole_stars(self) -> u8 {
        self.0.floor() as u8
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Rating::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ratings 集合中的文档
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingDoc {
    pub rating: Rating,
}

/// 单个星位的填充状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

/// 将评分渲染为五个星位
///
/// 第 i 个星位（从 0 开始）在评分 >= i+1 时全满，>= i+0.5 时半满。
pub fn stars(value: f64) -> [StarFill; MAX_STARS] {
    let mut result = [StarFill::Empty; MAX_STARS];
    for (i, slot) in result.iter_mut().enumerate() {
        let index = i as f64;
        *slot = if value >= index + 1.0 {
            StarFill::Full
        } else if value >= index + 0.5 {
            StarFill::Half
        } else {
            StarFill::Empty
        };
    }
    result
}

/// 卡片上展示的评分：有用户评分时使用用户评分，否则使用目录评分，两者不做平均
pub fn displayed_rating(user_rating: Option<Rating>, catalog_rating: f64) -> f64 {
    match user_rating {
        Some(rating) => rating.value(),
        None => catalog_rating,
    }
}

/// 评分分组（library 页面）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RatingBucket {
    FiveStars,
    FourStars,
    ThreeStars,
    TwoStars,
    OneStar,
    NotRated,
}

impl RatingBucket {
    /// 从 5 星到未评分的展示顺序
    pub const ALL: [RatingBucket; 6] = [
        RatingBucket::FiveStars,
        RatingBucket::FourStars,
        RatingBucket::ThreeStars,
        RatingBucket::TwoStars,
        RatingBucket::OneStar,
        RatingBucket::NotRated,
    ];

    /// 半星评分归入向下取整的整星分组，0.5 星视为 1 星
    pub fn for_rating(rating: Option<Rating>) -> Self {
        match rating.map(|r| r.whole_stars().max(1)) {
            Some(5) => RatingBucket::FiveStars,
            Some(4) => RatingBucket::FourStars,
            Some(3) => RatingBucket::ThreeStars,
            Some(2) => RatingBucket::TwoStars,
            Some(_) => RatingBucket::OneStar,
            None => RatingBucket::NotRated,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingBucket::FiveStars => "5 Stars",
            RatingBucket::FourStars => "4 Stars",
            RatingBucket::ThreeStars => "3 Stars",
            RatingBucket::TwoStars => "2 Stars",
            RatingBucket::OneStar => "1 Star",
            RatingBucket::NotRated => "Not Rated",
        }
    }
}
