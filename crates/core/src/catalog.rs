//! Curriculum model - domains, subdomains and checkable points.

use serde::{Deserialize, Serialize};
use crate::key::CompletionKey;

/// Numeric domain identifier as used in completion keys.
pub type DomainId = u32;

/// A top-level curriculum area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    /// Domain identifier
    pub id: DomainId,

    /// Display name
    pub name: String,

    /// Inactive domains are skipped by aggregate views
    #[serde(default = "default_active")]
    pub active: bool,

    /// Ordered subdomains
    #[serde(default)]
    pub subdomains: Vec<Subdomain>,
}

/// A group of points inside a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subdomain {
    /// Display title
    pub title: String,

    /// Ordered points
    #[serde(default)]
    pub points: Vec<Point>,
}

/// The smallest checkable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PointRepr", into = "PointRepr")]
pub struct Point {
    /// Point text
    pub text: String,
}

// Catalog files may list points either as bare strings or as objects.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Text(String),
    Object { text: String },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Text(text) | PointRepr::Object { text } => Point { text },
        }
    }
}

impl From<Point> for PointRepr {
    fn from(point: Point) -> Self {
        PointRepr::Text(point.text)
    }
}

fn default_active() -> bool {
    true
}

impl Domain {
    /// Total number of points across all subdomains.
    pub fn total_points(&self) -> usize {
        self.subdomains.iter().map(|s| s.points.len()).sum()
    }

    /// Completion keys of every point, in catalog order.
    pub fn point_keys(&self) -> impl Iterator<Item = CompletionKey> + '_ {
        self.subdomains
            .iter()
            .enumerate()
            .flat_map(move |(s, sub)| {
                (0..sub.points.len()).map(move |p| CompletionKey::new(self.id, s, p))
            })
    }

    /// Whether `key` addresses a point of this domain.
    pub fn contains(&self, key: &CompletionKey) -> bool {
        key.domain_id == self.id
            && self
                .subdomains
                .get(key.subdomain_index)
                .is_some_and(|s| key.point_index < s.points.len())
    }

    /// Text of the point addressed by `key`.
    pub fn point(&self, key: &CompletionKey) -> Option<&Point> {
        if key.domain_id != self.id {
            return None;
        }
        self.subdomains
            .get(key.subdomain_index)?
            .points
            .get(key.point_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Domain {
        serde_json::from_str(
            r#"{
                "id": 4,
                "name": "Networking",
                "subdomains": [
                    { "title": "Layers", "points": ["Physical", "Link", {"text": "IP"}] },
                    { "title": "Transport", "points": ["TCP"] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_domain_defaults_to_active() {
        assert!(sample().active);
    }

    #[test]
    fn test_total_points() {
        assert_eq!(sample().total_points(), 4);
    }

    #[test]
    fn test_point_keys_in_catalog_order() {
        let keys: Vec<String> = sample().point_keys().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["codex_d4_s0_p0", "codex_d4_s0_p1", "codex_d4_s0_p2", "codex_d4_s1_p0"]
        );
    }

    #[test]
    fn test_contains_checks_bounds() {
        let domain = sample();
        assert!(domain.contains(&CompletionKey::new(4, 1, 0)));
        assert!(!domain.contains(&CompletionKey::new(4, 1, 1)));
        assert!(!domain.contains(&CompletionKey::new(4, 2, 0)));
        assert!(!domain.contains(&CompletionKey::new(5, 0, 0)));
        assert_eq!(domain.point(&CompletionKey::new(4, 0, 2)).unwrap().text, "IP");
    }
}
