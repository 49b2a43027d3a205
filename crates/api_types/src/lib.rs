use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Tri-state field for PATCH bodies.
///
/// A field left out of the JSON object stays `Absent` (via
/// `#[serde(default)]`), an explicit `null` becomes `Null`, and a value
/// becomes `Set`. Plain `Option` cannot tell the first two apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
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
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Callers skip absent fields with `skip_serializing_if`.
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
        /// ISO 4217 code; the server defaults to EUR when absent.
        pub currency_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: Option<String>,
        /// Only changeable while the budget has no accounts.
        pub currency_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub currency_code: String,
        pub owner_user_id: Uuid,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsResponse {
        pub budgets: Vec<BudgetView>,
    }

    /// Request body for adding a member by verified email.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: Uuid,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod currency {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyView {
        pub code: String,
        pub name: String,
        pub symbol: Option<String>,
        /// Decimal places of the minor unit (2 for EUR, 0 for JPY).
        pub minor_unit: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrenciesResponse {
        pub currencies: Vec<CurrencyView>,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        /// One of: checking, savings, credit_card, cash, loan,
        /// investment, asset, liability.
        pub account_type: String,
        /// Must match the budget's base currency; defaults to it.
        pub currency_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub account_type: String,
        pub currency_code: String,
        pub is_active: bool,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Parent must itself be a root category.
        pub parent_id: Option<Uuid>,
        pub sort_order: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        /// `null` detaches the category from its parent.
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub parent_id: Patch<Uuid>,
        pub is_archived: Option<bool>,
        pub sort_order: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub parent_id: Option<Uuid>,
        pub is_archived: bool,
        pub sort_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod payee {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeesResponse {
        pub payees: Vec<PayeeView>,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagsResponse {
        pub tags: Vec<TagView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineNew {
        pub account_id: Uuid,
        pub category_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        /// Signed, non-zero, in the currency's minor unit.
        pub amount_minor: i64,
        pub memo: Option<String>,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// RFC3339 timestamp, including timezone offset; defaults to now.
        pub posted_at: Option<DateTime<FixedOffset>>,
        /// One of: pending, posted, reconciled, void. Defaults to posted.
        pub status: Option<String>,
        pub notes: Option<String>,
        pub import_id: Option<String>,
        pub line: LineNew,
    }

    /// Patch for one existing line; only mentioned fields change.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineUpdate {
        pub line_id: Uuid,
        pub account_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub category_id: Patch<Uuid>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub payee_id: Patch<Uuid>,
        pub amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub memo: Patch<String>,
        /// Replaces the whole tag set when present.
        pub tag_ids: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub posted_at: Patch<DateTime<FixedOffset>>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub status: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub notes: Patch<String>,
        /// Immutable once set; sending it again is rejected.
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub import_id: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        pub lines: Patch<Vec<LineUpdate>>,
    }

    /// Replaces every line of a non-transfer transaction.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionSplit {
        pub lines: Vec<LineNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        /// Written as -amount on the source line and +amount on the
        /// destination line.
        pub amount_minor: i64,
        pub posted_at: Option<DateTime<FixedOffset>>,
        pub status: Option<String>,
        pub notes: Option<String>,
        /// Rejected if present; transfers carry no payee.
        pub payee_id: Option<Uuid>,
        pub memo: Option<String>,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
        pub import_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportDraft {
        /// Source-system identifier; re-importing the same id is a no-op.
        pub import_id: String,
        pub posted_at: Option<DateTime<FixedOffset>>,
        pub status: Option<String>,
        pub notes: Option<String>,
        pub line: LineNew,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkImport {
        pub transactions: Vec<ImportDraft>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkImportResponse {
        pub created: u64,
        pub existing: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub category_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        pub amount_minor: i64,
        pub memo: Option<String>,
        pub tag_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub posted_at: DateTime<FixedOffset>,
        pub status: String,
        pub notes: Option<String>,
        pub import_id: Option<String>,
        pub created_at: DateTime<FixedOffset>,
        pub lines: Vec<LineView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }
}
