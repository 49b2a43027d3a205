use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, Patch, ResultEngine, TransactionStatus};

use super::super::normalize_optional_text;

/// The shape-relevant view of a line, merged old+new during updates.
#[derive(Clone, Copy, Debug)]
pub(super) struct LineSnapshot {
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount_minor: i64,
}

/// Exactly two lines, two distinct accounts, no category on either,
/// amounts summing to zero.
pub(super) fn is_valid_transfer(lines: &[LineSnapshot]) -> bool {
    match lines {
        [a, b] => {
            a.account_id != b.account_id
                && a.category_id.is_none()
                && b.category_id.is_none()
                && a.amount_minor.checked_add(b.amount_minor) == Some(0)
        }
        _ => false,
    }
}

/// One or more lines all against the same account.
pub(super) fn is_valid_non_transfer(lines: &[LineSnapshot]) -> bool {
    match lines {
        [] => false,
        [first, rest @ ..] => rest.iter().all(|l| l.account_id == first.account_id),
    }
}

pub(super) fn require_valid_shape(lines: &[LineSnapshot]) -> ResultEngine<()> {
    if is_valid_transfer(lines) || is_valid_non_transfer(lines) {
        return Ok(());
    }
    Err(EngineError::InvalidTransactionLines(
        "lines are neither a balanced transfer nor a single-account set".to_string(),
    ))
}

/// Trim + lowercase a raw status; absent means posted.
pub(super) fn normalize_status(raw: Option<&str>) -> ResultEngine<TransactionStatus> {
    match raw {
        None => Ok(TransactionStatus::Posted),
        Some(raw) => TransactionStatus::try_from(raw.trim().to_lowercase().as_str()),
    }
}

pub(super) fn apply_posted_at_patch(
    existing: DateTime<Utc>,
    patch: &Patch<DateTime<Utc>>,
) -> ResultEngine<DateTime<Utc>> {
    match patch {
        Patch::Absent => Ok(existing),
        Patch::Null => Err(EngineError::PostedAtRequired),
        Patch::Set(value) => Ok(*value),
    }
}

pub(super) fn apply_status_patch(
    existing: TransactionStatus,
    patch: &Patch<String>,
) -> ResultEngine<TransactionStatus> {
    match patch {
        Patch::Absent => Ok(existing),
        Patch::Null => Err(EngineError::StatusRequired),
        Patch::Set(value) => normalize_status(Some(value.as_str())),
    }
}

pub(super) fn apply_nullable_text_patch(
    existing: Option<String>,
    patch: &Patch<String>,
) -> Option<String> {
    match patch {
        Patch::Absent => existing,
        Patch::Null => None,
        Patch::Set(value) => normalize_optional_text(Some(value.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(account_id: Uuid, amount_minor: i64) -> LineSnapshot {
        LineSnapshot {
            account_id,
            category_id: None,
            amount_minor,
        }
    }

    #[test]
    fn two_balanced_lines_on_distinct_accounts_are_a_transfer() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(is_valid_transfer(&[line(a, -750), line(b, 750)]));
    }

    #[test]
    fn transfer_rejects_same_account_unbalanced_or_categorized() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(!is_valid_transfer(&[line(a, -750), line(a, 750)]));
        assert!(!is_valid_transfer(&[line(a, -750), line(b, 700)]));

        let mut categorized = line(a, -750);
        categorized.category_id = Some(Uuid::new_v4());
        assert!(!is_valid_transfer(&[categorized, line(b, 750)]));

        // A wrapping sum must not pass as balanced.
        assert!(!is_valid_transfer(&[line(a, i64::MIN), line(b, i64::MIN)]));
    }

    #[test]
    fn non_transfer_requires_a_single_shared_account() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(is_valid_non_transfer(&[line(a, -100)]));
        assert!(is_valid_non_transfer(&[line(a, -100), line(a, -200)]));
        assert!(!is_valid_non_transfer(&[]));
        assert!(!is_valid_non_transfer(&[line(a, -100), line(b, -200)]));
    }

    #[test]
    fn status_normalization_trims_and_lowercases() {
        assert_eq!(normalize_status(None).unwrap(), TransactionStatus::Posted);
        assert_eq!(
            normalize_status(Some("  Reconciled ")).unwrap(),
            TransactionStatus::Reconciled
        );
        assert_eq!(
            normalize_status(Some("cleared")).unwrap_err(),
            EngineError::InvalidStatus("cleared".to_string())
        );
    }

    #[test]
    fn posted_at_null_patch_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            apply_posted_at_patch(now, &Patch::Null).unwrap_err(),
            EngineError::PostedAtRequired
        );
        assert_eq!(apply_posted_at_patch(now, &Patch::Absent).unwrap(), now);
    }
}
