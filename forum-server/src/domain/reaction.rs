use std::fmt;

use serde::Serialize;

use super::error::DomainError;
use super::validation::validate_positive_i64;

/// Kind of object a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ReactionTarget {
    pub(crate) kind: TargetKind,
    pub(crate) id: i64,
}

impl ReactionTarget {
    pub(crate) fn post(id: i64) -> Self {
        Self {
            kind: TargetKind::Post,
            id,
        }
    }

    pub(crate) fn comment(id: i64) -> Self {
        Self {
            kind: TargetKind::Comment,
            id,
        }
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("target_id", self.id)?;
        Ok(self)
    }
}

/// A stored vote. There is no zero value: absence of a row means no reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReactionValue {
    Like,
    Dislike,
}

impl ReactionValue {
    pub(crate) fn from_i64(value: i64) -> Result<Self, DomainError> {
        match value {
            1 => Ok(ReactionValue::Like),
            -1 => Ok(ReactionValue::Dislike),
            _ => Err(DomainError::Validation {
                field: "value",
                message: "must be 1 or -1",
            }),
        }
    }

    pub(crate) fn as_i16(self) -> i16 {
        match self {
            ReactionValue::Like => 1,
            ReactionValue::Dislike => -1,
        }
    }
}

impl TryFrom<i16> for ReactionValue {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_i64(i64::from(value))
    }
}

/// The single write a toggle performs on the (user, target) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReactionChange {
    Inserted(ReactionValue),
    Removed,
    Flipped(ReactionValue),
}

impl ReactionChange {
    /// Tri-state toggle: NONE -> value, same value -> NONE, other value -> flip.
    pub(crate) fn decide(existing: Option<ReactionValue>, requested: ReactionValue) -> Self {
        match existing {
            None => ReactionChange::Inserted(requested),
            Some(current) if current == requested => ReactionChange::Removed,
            Some(_) => ReactionChange::Flipped(requested),
        }
    }

    /// State of the (user, target) pair after the change is applied.
    pub(crate) fn resulting(self) -> Option<ReactionValue> {
        match self {
            ReactionChange::Inserted(value) | ReactionChange::Flipped(value) => Some(value),
            ReactionChange::Removed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct ReactionCounts {
    pub(crate) likes: i64,
    pub(crate) dislikes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReactionOutcome {
    pub(crate) change: ReactionChange,
    pub(crate) counts: ReactionCounts,
}

#[cfg(test)]
mod tests {
    use super::{ReactionChange, ReactionTarget, ReactionValue};
    use crate::domain::error::DomainError;

    use ReactionValue::{Dislike, Like};

    #[test]
    fn decide_covers_every_transition() {
        let cases = [
            (None, Like, ReactionChange::Inserted(Like), Some(Like)),
            (None, Dislike, ReactionChange::Inserted(Dislike), Some(Dislike)),
            (Some(Like), Like, ReactionChange::Removed, None),
            (Some(Like), Dislike, ReactionChange::Flipped(Dislike), Some(Dislike)),
            (Some(Dislike), Dislike, ReactionChange::Removed, None),
            (Some(Dislike), Like, ReactionChange::Flipped(Like), Some(Like)),
        ];

        for (existing, requested, expected_change, expected_state) in cases {
            let change = ReactionChange::decide(existing, requested);
            assert_eq!(change, expected_change, "{existing:?} + {requested:?}");
            assert_eq!(change.resulting(), expected_state);
        }
    }

    #[test]
    fn from_i64_accepts_only_unit_votes() {
        assert_eq!(ReactionValue::from_i64(1).expect("like"), Like);
        assert_eq!(ReactionValue::from_i64(-1).expect("dislike"), Dislike);
        for bad in [0, 2, -2, i64::MAX] {
            let err = ReactionValue::from_i64(bad).expect_err("must be rejected");
            assert!(matches!(err, DomainError::Validation { field: "value", .. }));
        }
    }

    #[test]
    fn stored_value_round_trips_through_i16() {
        for value in [Like, Dislike] {
            assert_eq!(ReactionValue::try_from(value.as_i16()).expect("valid"), value);
        }
        assert!(ReactionValue::try_from(0_i16).is_err());
    }

    #[test]
    fn target_rejects_non_positive_id() {
        assert!(ReactionTarget::post(0).validate().is_err());
        assert!(ReactionTarget::comment(5).validate().is_ok());
    }
}
