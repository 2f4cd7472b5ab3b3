//! Role-gated admin surface: banners, user roles and aggregate stats.

pub mod banners;
pub mod stats;
pub mod users;

pub use banners::{BannerInput, BannerService};
pub use stats::{AdminStats, StatsService};
pub use users::UserAdminService;
