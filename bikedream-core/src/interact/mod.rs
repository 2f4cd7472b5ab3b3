//! Interaction engine: favorites, ratings, comments, achievements,
//! garages, groups, user requests and best-effort analytics.

pub mod achievements;
pub mod analytics;
pub mod comments;
pub mod favorites;
pub mod garage;
pub mod groups;
pub mod ratings;
pub mod requests;

pub use achievements::{AchievementService, AchievementView};
pub use analytics::AnalyticsSink;
pub use comments::{CommentService, CommentView};
pub use favorites::FavoriteService;
pub use garage::{GarageItemInput, GarageService};
pub use groups::{GroupInput, GroupService};
pub use ratings::{RatingService, RatingView};
pub use requests::{RequestInput, RequestResponseInput, RequestService};
