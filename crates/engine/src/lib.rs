//! Ledger core for the budgeting backend.
//!
//! The engine owns the database and exposes the operations the HTTP layer
//! calls: budget/account/category/payee/tag management, the transaction
//! invariant engine (create, patch, split, transfer, delete) and the bulk
//! import coordinator. Every multi-row write runs inside a single database
//! transaction.

mod accounts;
mod budget_members;
mod budgets;
mod categories;
mod commands;
mod currencies;
mod error;
mod line_tags;
mod ops;
mod payees;
mod tags;
mod transaction_lines;
mod transactions;
pub mod users;

pub use accounts::{Account, AccountType};
pub use budget_members::BudgetMember;
pub use budgets::Budget;
pub use categories::Category;
pub use commands::{
    BulkImportCmd, BulkImportOutcome, CreateTransactionCmd, CreateTransferCmd, LinePatch, NewLine,
    Patch, SplitTransactionCmd, TransactionDraft, UpdateCategoryCmd, UpdateTransactionCmd,
};
pub use currencies::Currency;
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use payees::Payee;
pub use tags::Tag;
pub use transaction_lines::TransactionLine;
pub use transactions::{Transaction, TransactionStatus};

pub type ResultEngine<T> = Result<T, EngineError>;
