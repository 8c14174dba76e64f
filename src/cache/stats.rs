//! View Statistics Module
//!
//! Membership and visibility counts for a proxy view.

use serde::Serialize;

// == View Stats ==
/// Snapshot of how much of a view's membership is currently visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    /// Keys opted into the view
    pub members: usize,
    /// Members the backing store currently holds
    pub visible: usize,
    /// Members the backing store no longer holds
    pub stale: usize,
}

impl ViewStats {
    // == Constructor ==
    /// Builds a snapshot from raw membership and visible counts.
    pub fn new(members: usize, visible: usize) -> Self {
        Self {
            members,
            visible,
            stale: members.saturating_sub(visible),
        }
    }

    // == Visibility Ratio ==
    /// Returns visible / members, or 0.0 for a view without members.
    pub fn visibility_ratio(&self) -> f64 {
        if self.members == 0 {
            0.0
        } else {
            self.visible as f64 / self.members as f64
        }
    }

    /// Whether every member is still visible.
    pub fn is_consistent(&self) -> bool {
        self.stale == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = ViewStats::default();
        assert_eq!(stats.members, 0);
        assert_eq!(stats.visible, 0);
        assert_eq!(stats.stale, 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_stats_stale_count() {
        let stats = ViewStats::new(5, 3);
        assert_eq!(stats.stale, 2);
        assert!(!stats.is_consistent());
    }

    #[test]
    fn test_visibility_ratio_no_members() {
        assert_eq!(ViewStats::new(0, 0).visibility_ratio(), 0.0);
    }

    #[test]
    fn test_visibility_ratio_mixed() {
        assert_eq!(ViewStats::new(4, 2).visibility_ratio(), 0.5);
        assert_eq!(ViewStats::new(2, 2).visibility_ratio(), 1.0);
    }

    #[test]
    fn test_stats_serialize() {
        let json = serde_json::to_string(&ViewStats::new(3, 2)).unwrap();
        assert_eq!(json, r#"{"members":3,"visible":2,"stale":1}"#);
    }
}
