//! 视图状态
//!
//! 每个视图独立持有自己的状态（`parking_lot::Mutex`），通过显式传入的目录、存储、
//! 会话和提示句柄完成操作。锁不会跨越 await 持有，UI 层通过 `snapshot` 读取状态。

pub mod account;
pub mod categories;
pub mod game_card;
pub mod game_details;
pub mod game_grid;
pub mod library_page;
pub mod mirror;
pub mod profile_page;
pub mod search_bar;
pub mod star_rating;
pub mod trending;

pub use account::{AccountForms, Header};
pub use categories::Categories;
pub use game_card::GameCard;
pub use game_details::{DetailsState, GameDetailsPage};
pub use game_grid::GameGrid;
pub use library_page::{LibraryFeed, LibraryPage, LibraryView};
pub use mirror::{Mirrored, WriteOutcome};
pub use profile_page::ProfilePage;
pub use search_bar::{SearchBar, SearchPhase};
pub use star_rating::StarRating;
pub use trending::Trending;
