//! Strongly typed entity records.
//!
//! Every entity the store holds is a plain serde type with an explicit
//! schema; unknown fields on input payloads are rejected at the HTTP
//! boundary rather than stored silently.

pub mod achievement;
pub mod banner;
pub mod community;
pub mod interaction;
pub mod job;
pub mod motorcycle;
pub mod region;
pub mod user;

pub use achievement::{Achievement, Comparator, UserAchievement, UserCounters};
pub use banner::Banner;
pub use community::{
    GarageItem, GarageStatus, GroupRole, GroupType, RequestPriority, RequestStatus, RiderGroup,
    UserRequest,
};
pub use interaction::{Comment, Favorite, Rating};
pub use job::{AnalyticsEvent, EventKind, JobStatus, UpdateJob, UpdateStats};
pub use motorcycle::{Availability, Category, Motorcycle, RegionalAvailability, TechSpecs};
pub use user::{Role, Session, SessionKind, User, UserView};
