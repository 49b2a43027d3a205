//! Command payloads for the transaction write operations.
//!
//! Commands carry exactly what the caller asked for; normalization and
//! validation happen inside the engine. Update commands use [`Patch`] so
//! an absent field, an explicit null and a set value stay distinguishable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tri-state patch field: not mentioned, explicitly null, or set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True when the field was mentioned at all (null or set).
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Set(value) => Patch::Set(value),
        }
    }

    /// Collapse to an option, treating null and absent alike.
    pub fn set_value(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }
}

/// A fully-specified new line, used by create, split and import.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLine {
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    pub amount_minor: i64,
    pub memo: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

impl NewLine {
    pub fn new(account_id: Uuid, amount_minor: i64) -> Self {
        Self {
            account_id,
            category_id: None,
            payee_id: None,
            amount_minor,
            memo: None,
            tag_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub budget_id: Uuid,
    pub user_id: Uuid,
    pub posted_at: Option<DateTime<Utc>>,
    /// Raw status string, normalized by the engine; absent means posted.
    pub status: Option<String>,
    pub notes: Option<String>,
    pub import_id: Option<String>,
    pub line: NewLine,
}

impl CreateTransactionCmd {
    pub fn new(budget_id: Uuid, user_id: Uuid, line: NewLine) -> Self {
        Self {
            budget_id,
            user_id,
            posted_at: None,
            status: None,
            notes: None,
            import_id: None,
            line,
        }
    }

    #[must_use]
    pub fn posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = Some(posted_at);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn import_id(mut self, import_id: impl Into<String>) -> Self {
        self.import_id = Some(import_id.into());
        self
    }
}

/// Patch for one existing line inside an update.
#[derive(Clone, Debug, Default)]
pub struct LinePatch {
    pub line_id: Uuid,
    pub account_id: Option<Uuid>,
    pub category_id: Patch<Uuid>,
    pub payee_id: Patch<Uuid>,
    pub amount_minor: Option<i64>,
    pub memo: Patch<String>,
    pub tag_ids: Option<Vec<Uuid>>,
}

impl LinePatch {
    pub fn new(line_id: Uuid) -> Self {
        Self {
            line_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Patch<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub fn payee(mut self, payee_id: Patch<Uuid>) -> Self {
        self.payee_id = payee_id;
        self
    }

    #[must_use]
    pub fn amount(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: Patch<String>) -> Self {
        self.memo = memo;
        self
    }

    #[must_use]
    pub fn tags(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = Some(tag_ids);
        self
    }

    /// True when the patch names at least one field beyond the id.
    pub fn is_effective(&self) -> bool {
        self.account_id.is_some()
            || self.category_id.is_present()
            || self.payee_id.is_present()
            || self.amount_minor.is_some()
            || self.memo.is_present()
            || self.tag_ids.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub posted_at: Patch<DateTime<Utc>>,
    pub status: Patch<String>,
    pub notes: Patch<String>,
    pub import_id: Patch<String>,
    pub lines: Patch<Vec<LinePatch>>,
}

impl UpdateTransactionCmd {
    pub fn new(budget_id: Uuid, transaction_id: Uuid, user_id: Uuid) -> Self {
        Self {
            budget_id,
            transaction_id,
            user_id,
            posted_at: Patch::Absent,
            status: Patch::Absent,
            notes: Patch::Absent,
            import_id: Patch::Absent,
            lines: Patch::Absent,
        }
    }

    #[must_use]
    pub fn posted_at(mut self, posted_at: Patch<DateTime<Utc>>) -> Self {
        self.posted_at = posted_at;
        self
    }

    #[must_use]
    pub fn status(mut self, status: Patch<String>) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Patch<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn import_id(mut self, import_id: Patch<String>) -> Self {
        self.import_id = import_id;
        self
    }

    #[must_use]
    pub fn lines(mut self, lines: Patch<Vec<LinePatch>>) -> Self {
        self.lines = lines;
        self
    }
}

#[derive(Clone, Debug)]
pub struct UpdateCategoryCmd {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub parent_id: Patch<Uuid>,
    pub is_archived: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateCategoryCmd {
    pub fn new(budget_id: Uuid, category_id: Uuid, user_id: Uuid) -> Self {
        Self {
            budget_id,
            category_id,
            user_id,
            name: None,
            parent_id: Patch::Absent,
            is_archived: None,
            sort_order: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn parent(mut self, parent_id: Patch<Uuid>) -> Self {
        self.parent_id = parent_id;
        self
    }

    #[must_use]
    pub fn archived(mut self, is_archived: bool) -> Self {
        self.is_archived = Some(is_archived);
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}

#[derive(Clone, Debug)]
pub struct SplitTransactionCmd {
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<NewLine>,
}

#[derive(Clone, Debug)]
pub struct CreateTransferCmd {
    pub budget_id: Uuid,
    pub user_id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Magnitude moved; the engine writes -amount on the source line and
    /// +amount on the destination line.
    pub amount_minor: i64,
    pub posted_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    /// Rejected if present; transfers carry no payee.
    pub payee_id: Option<Uuid>,
    pub memo: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub import_id: Option<String>,
}

impl CreateTransferCmd {
    pub fn new(
        budget_id: Uuid,
        user_id: Uuid,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
    ) -> Self {
        Self {
            budget_id,
            user_id,
            from_account_id,
            to_account_id,
            amount_minor,
            posted_at: None,
            status: None,
            notes: None,
            payee_id: None,
            memo: None,
            tag_ids: Vec::new(),
            import_id: None,
        }
    }

    #[must_use]
    pub fn posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = Some(posted_at);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    #[must_use]
    pub fn import_id(mut self, import_id: impl Into<String>) -> Self {
        self.import_id = Some(import_id.into());
        self
    }
}

/// One transaction to import; `import_id` is what makes re-runs idempotent.
#[derive(Clone, Debug)]
pub struct TransactionDraft {
    pub import_id: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub line: NewLine,
}

impl TransactionDraft {
    pub fn new(import_id: impl Into<String>, line: NewLine) -> Self {
        Self {
            import_id: import_id.into(),
            posted_at: None,
            status: None,
            notes: None,
            line,
        }
    }

    #[must_use]
    pub fn posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = Some(posted_at);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct BulkImportCmd {
    pub budget_id: Uuid,
    pub user_id: Uuid,
    pub drafts: Vec<TransactionDraft>,
}

/// How a bulk import batch landed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkImportOutcome {
    pub created: u64,
    pub existing: u64,
}
