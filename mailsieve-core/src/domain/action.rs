//! Terminal actions a scan can resolve to.
//!
//! The set is closed and ordered by severity, most severe first. `Reject` is
//! always the most severe outcome and `NoAction` the terminal fallback; the
//! derived `Ord` follows declaration order, so iterating a
//! `BTreeMap<Action, _>` visits actions severest-first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What the filter ultimately does with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Refuse the message outright.
    #[serde(rename = "reject")]
    Reject,
    /// Refuse temporarily (the sender is expected to retry).
    #[serde(rename = "soft-reject", alias = "soft reject")]
    SoftReject,
    /// Deliver, but tag the subject line.
    #[serde(rename = "rewrite-subject", alias = "rewrite subject")]
    RewriteSubject,
    /// Deliver, but add a spam header.
    #[serde(rename = "add-header", alias = "add header")]
    AddHeader,
    /// Delay with a temporary error to probe sender behavior.
    #[serde(rename = "greylist")]
    Greylist,
    /// Deliver unchanged.
    #[serde(rename = "no-action", alias = "no action")]
    NoAction,
}

impl Action {
    /// Every action, severest first.
    pub const ALL: [Action; 6] = [
        Action::Reject,
        Action::SoftReject,
        Action::RewriteSubject,
        Action::AddHeader,
        Action::Greylist,
        Action::NoAction,
    ];

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Reject => "reject",
            Action::SoftReject => "soft-reject",
            Action::RewriteSubject => "rewrite-subject",
            Action::AddHeader => "add-header",
            Action::Greylist => "greylist",
            Action::NoAction => "no-action",
        }
    }

    /// Whether the action stops delivery (permanently or temporarily).
    pub fn is_rejecting(self) -> bool {
        matches!(self, Action::Reject | Action::SoftReject)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized action names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    /// Accepts both the canonical kebab-case names and the legacy
    /// space-separated spellings ("soft reject", "add header", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Action::Reject),
            "soft-reject" | "soft reject" => Ok(Action::SoftReject),
            "rewrite-subject" | "rewrite subject" => Ok(Action::RewriteSubject),
            "add-header" | "add header" => Ok(Action::AddHeader),
            "greylist" => Ok(Action::Greylist),
            "no-action" | "no action" => Ok(Action::NoAction),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order_follows_declaration() {
        assert!(Action::Reject < Action::SoftReject);
        assert!(Action::SoftReject < Action::RewriteSubject);
        assert!(Action::Greylist < Action::NoAction);
    }

    #[test]
    fn all_is_severest_first() {
        let mut sorted = Action::ALL;
        sorted.sort();
        assert_eq!(sorted, Action::ALL);
    }

    #[test]
    fn round_trips_wire_names() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn accepts_legacy_spellings() {
        assert_eq!("soft reject".parse::<Action>().unwrap(), Action::SoftReject);
        assert_eq!("add header".parse::<Action>().unwrap(), Action::AddHeader);
        assert_eq!("no action".parse::<Action>().unwrap(), Action::NoAction);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "quarantine".parse::<Action>().unwrap_err();
        assert_eq!(err, UnknownAction("quarantine".into()));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Action::SoftReject).unwrap();
        assert_eq!(json, "\"soft-reject\"");
        let back: Action = serde_json::from_str("\"soft reject\"").unwrap();
        assert_eq!(back, Action::SoftReject);
    }

    #[test]
    fn rejecting_actions() {
        assert!(Action::Reject.is_rejecting());
        assert!(Action::SoftReject.is_rejecting());
        assert!(!Action::AddHeader.is_rejecting());
        assert!(!Action::NoAction.is_rejecting());
    }
}
