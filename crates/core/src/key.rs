//! Completion keys - the stored identity of one checked point.

use crate::catalog::DomainId;

/// Prefix shared by every completion key.
pub const COMPLETION_KEY_PREFIX: &str = "codex_d";

/// Value stored under a completion key while the point is checked.
pub const COMPLETION_MARKER: &str = "true";

/// Identity of a single point: `(domain, subdomain index, point index)`.
///
/// Serialized as `codex_d{domain}_s{subdomain}_p{point}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionKey {
    /// Owning domain
    pub domain_id: DomainId,
    /// Position of the subdomain inside the domain
    pub subdomain_index: usize,
    /// Position of the point inside the subdomain
    pub point_index: usize,
}

/// Error returned when a string does not have the completion-key shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a completion key: {0}")]
pub struct KeyParseError(pub String);

impl CompletionKey {
    /// Create a new key.
    pub fn new(domain_id: DomainId, subdomain_index: usize, point_index: usize) -> Self {
        Self {
            domain_id,
            subdomain_index,
            point_index,
        }
    }

    /// Whether `s` is a canonical completion key.
    pub fn matches(s: &str) -> bool {
        s.parse::<CompletionKey>().is_ok()
    }
}

impl std::fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}_s{}_p{}",
            COMPLETION_KEY_PREFIX, self.domain_id, self.subdomain_index, self.point_index
        )
    }
}

impl std::str::FromStr for CompletionKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || KeyParseError(s.to_string());

        let rest = s.strip_prefix(COMPLETION_KEY_PREFIX).ok_or_else(err)?;
        let (domain, rest) = rest.split_once("_s").ok_or_else(err)?;
        let (subdomain, point) = rest.split_once("_p").ok_or_else(err)?;

        let key = CompletionKey {
            domain_id: parse_index(domain).ok_or_else(err)?,
            subdomain_index: parse_index(subdomain).ok_or_else(err)?,
            point_index: parse_index(point).ok_or_else(err)?,
        };

        // Leading zeros would alias another key's identity.
        if key.to_string() != s {
            return Err(err());
        }
        Ok(key)
    }
}

fn parse_index<T: std::str::FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
