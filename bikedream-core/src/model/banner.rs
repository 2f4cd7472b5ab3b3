//! Site banners managed from the admin surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An announcement banner. A banner is "live" when it is active and the
/// current instant falls inside its window; an unset bound leaves that
/// side of the window open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub message: String,
    /// 0..=100; higher renders first.
    pub priority: u8,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.map_or(true, |t| now >= t)
            && self.ends_at.map_or(true, |t| now <= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn banner() -> Banner {
        Banner {
            id: "b-1".to_string(),
            message: "Track day weekend".to_string(),
            priority: 50,
            active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_window_is_live() {
        assert!(banner().is_live_at(Utc::now()));
    }

    #[test]
    fn test_inactive_is_never_live() {
        let mut b = banner();
        b.active = false;
        assert!(!b.is_live_at(Utc::now()));
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc::now();
        let mut b = banner();

        b.starts_at = Some(now + Duration::hours(1));
        assert!(!b.is_live_at(now));

        b.starts_at = Some(now - Duration::hours(2));
        b.ends_at = Some(now - Duration::hours(1));
        assert!(!b.is_live_at(now));

        b.ends_at = Some(now + Duration::hours(1));
        assert!(b.is_live_at(now));
    }
}
