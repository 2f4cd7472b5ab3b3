//! Community entities: virtual garages, rider groups and user requests.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Relationship between a rider and a motorcycle in their garage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GarageStatus {
    Owned,
    Wishlist,
    PreviouslyOwned,
    TestRidden,
}

/// A motorcycle in a user's virtual garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarageItem {
    pub id: String,
    pub user_id: String,
    pub motorcycle_id: String,
    pub status: GarageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    General,
    Location,
    Brand,
    RidingStyle,
}

/// Membership role inside a rider group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupRole {
    Creator,
    Admin,
    Member,
}

/// A rider group. The creator is always present in the member map with
/// role [`GroupRole::Creator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderGroup {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<u32>,
    #[serde(default)]
    pub public: bool,
    pub members: BTreeMap<String, GroupRole>,
    pub created_at: DateTime<Utc>,
}

impl RiderGroup {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.max_members.map_or(false, |max| self.members.len() as u32 >= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

/// A request filed by a user (missing motorcycle, data correction, ...),
/// triaged from the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    pub id: String,
    pub user_id: String,
    pub request_type: String,
    pub priority: RequestPriority,
    pub title: String,
    pub description: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_capacity() {
        let mut group = RiderGroup {
            id: "g-1".to_string(),
            creator_id: "u-1".to_string(),
            name: "Alpine Tourers".to_string(),
            description: String::new(),
            group_type: GroupType::RidingStyle,
            location: None,
            max_members: Some(2),
            public: true,
            members: BTreeMap::from([("u-1".to_string(), GroupRole::Creator)]),
            created_at: Utc::now(),
        };
        assert!(!group.is_full());
        group.members.insert("u-2".to_string(), GroupRole::Member);
        assert!(group.is_full());
        assert_eq!(group.member_count(), 2);
    }

    #[test]
    fn test_unbounded_group_never_full() {
        let group = RiderGroup {
            id: "g-2".to_string(),
            creator_id: "u-1".to_string(),
            name: "Open Riders".to_string(),
            description: String::new(),
            group_type: GroupType::General,
            location: None,
            max_members: None,
            public: true,
            members: BTreeMap::from([("u-1".to_string(), GroupRole::Creator)]),
            created_at: Utc::now(),
        };
        assert!(!group.is_full());
    }
}
