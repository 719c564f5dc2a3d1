//! Share payload - a portable snapshot of completion state.

use serde::{Deserialize, Serialize};
use crate::progress::CompletionSnapshot;
use crate::EpochMillis;

/// Point-in-time snapshot exchanged through share links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    /// When the snapshot was taken
    #[serde(default)]
    pub created_at: EpochMillis,

    /// Checked completion keys
    pub checked: CompletionSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_is_required() {
        assert!(serde_json::from_str::<SharePayload>(r#"{"createdAt": 5}"#).is_err());
    }

    #[test]
    fn test_wire_shape() {
        let payload: SharePayload = serde_json::from_str(
            r#"{"createdAt": 1700000000000, "checked": {"codex_d2_s1_p0": "true"}}"#,
        )
        .unwrap();
        assert_eq!(payload.created_at, 1_700_000_000_000);
        assert_eq!(payload.checked.len(), 1);
    }
}
