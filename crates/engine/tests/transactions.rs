use chrono::{Duration, Utc};

use engine::{
    CreateTransactionCmd, CreateTransferCmd, EngineError, LinePatch, NewLine, Patch,
    SplitTransactionCmd, TransactionStatus, UpdateTransactionCmd,
};
use uuid::Uuid;

mod common;
use common::{engine_with_budget, seed_user};

#[tokio::test]
async fn create_defaults_to_posted_now() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let before = Utc::now();
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -500),
        ))
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Posted);
    assert!(tx.posted_at >= before);
    assert_eq!(tx.lines.len(), 1);
    assert_eq!(tx.lines[0].amount_minor, -500);
    assert_eq!(tx.import_id, None);

    let read_back = engine
        .transaction(budget_id, tx.id, user_id)
        .await
        .unwrap();
    assert_eq!(read_back.lines[0].account_id, account_id);
}

#[tokio::test]
async fn zero_amounts_are_rejected() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, 0),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ZeroAmount);

    let savings = engine
        .new_account(budget_id, user_id, "Savings", "savings", None)
        .await
        .unwrap();
    let err = engine
        .create_transfer(CreateTransferCmd::new(
            budget_id, user_id, account_id, savings.id, 0,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ZeroAmount);
}

#[tokio::test]
async fn unknown_line_refs_are_rejected() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let missing = Uuid::new_v4();
    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100).tags(vec![missing]),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TagNotFound(missing.to_string()));

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100).category(missing),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CategoryNotFound(missing.to_string()));
}

#[tokio::test]
async fn duplicate_tags_are_deduped_keeping_first_seen_order() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let groceries = engine
        .new_tag(budget_id, user_id, "groceries")
        .await
        .unwrap();
    let weekly = engine.new_tag(budget_id, user_id, "weekly").await.unwrap();

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100).tags(vec![
                groceries.id,
                groceries.id,
                weekly.id,
                groceries.id,
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(tx.lines[0].tag_ids, vec![groceries.id, weekly.id]);

    let read_back = engine
        .transaction(budget_id, tx.id, user_id)
        .await
        .unwrap();
    let mut tags = read_back.lines[0].tag_ids.clone();
    tags.sort();
    let mut expected = vec![groceries.id, weekly.id];
    expected.sort();
    assert_eq!(tags, expected);
}

#[tokio::test]
async fn update_patches_only_mentioned_fields() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let tx = engine
        .create_transaction(
            CreateTransactionCmd::new(budget_id, user_id, NewLine::new(account_id, -100))
                .notes("groceries run"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .status(Patch::Set("reconciled".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TransactionStatus::Reconciled);
    assert_eq!(updated.notes, Some("groceries run".to_string()));

    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(budget_id, tx.id, user_id).notes(Patch::Null))
        .await
        .unwrap();
    assert_eq!(updated.notes, None);
    assert_eq!(updated.status, TransactionStatus::Reconciled);
}

#[tokio::test]
async fn update_guards_required_header_fields() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100),
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(budget_id, tx.id, user_id))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoFieldsToUpdate);

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id).posted_at(Patch::Null),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PostedAtRequired);

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id).status(Patch::Null),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::StatusRequired);

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .status(Patch::Set("cleared".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidStatus("cleared".to_string()));
}

#[tokio::test]
async fn import_id_is_immutable_once_set() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let tx = engine
        .create_transaction(
            CreateTransactionCmd::new(budget_id, user_id, NewLine::new(account_id, -100))
                .import_id("bank-1"),
        )
        .await
        .unwrap();

    // Changing it is rejected.
    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .import_id(Patch::Set("bank-2".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ImportIdImmutable);

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id).import_id(Patch::Null),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ImportIdImmutable);

    // Re-sending the identical value as the sole field is also rejected.
    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .import_id(Patch::Set("bank-1".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ImportIdImmutable);

    // But alongside other fields the identical value is a tolerated no-op.
    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .import_id(Patch::Set("bank-1".to_string()))
                .notes(Patch::Set("statement row 7".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(updated.import_id, Some("bank-1".to_string()));
    assert_eq!(updated.notes, Some("statement row 7".to_string()));

    // A transaction created without one can never gain one.
    let plain = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -200),
        ))
        .await
        .unwrap();
    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, plain.id, user_id)
                .import_id(Patch::Set("bank-2".to_string()))
                .notes(Patch::Set("late tag".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ImportIdImmutable);
    assert_eq!(plain.import_id, None);
}

#[tokio::test]
async fn update_validates_line_patches() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100),
        ))
        .await
        .unwrap();
    let line_id = tx.lines[0].id;

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id).lines(Patch::Set(vec![
                LinePatch::new(line_id).amount(-50),
                LinePatch::new(line_id).amount(-60),
            ])),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DuplicateLineId(line_id.to_string()));

    let ghost = Uuid::new_v4();
    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .lines(Patch::Set(vec![LinePatch::new(ghost).amount(-50)])),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::LineNotFound(ghost.to_string()));

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .lines(Patch::Set(vec![LinePatch::new(line_id).amount(0)])),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ZeroAmount);

    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id)
                .lines(Patch::Set(vec![LinePatch::new(line_id).amount(-75)])),
        )
        .await
        .unwrap();
    assert_eq!(updated.lines[0].amount_minor, -75);
}

#[tokio::test]
async fn update_rejects_patches_that_break_the_line_shape() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;
    let savings = engine
        .new_account(budget_id, user_id, "Savings", "savings", None)
        .await
        .unwrap();

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -300),
        ))
        .await
        .unwrap();
    let split = engine
        .split_transaction(SplitTransactionCmd {
            budget_id,
            transaction_id: tx.id,
            user_id,
            lines: vec![
                NewLine::new(account_id, -100),
                NewLine::new(account_id, -200),
            ],
        })
        .await
        .unwrap();

    // Moving one of two same-account lines to another account leaves
    // neither a transfer nor a single-account set.
    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new(budget_id, tx.id, user_id).lines(Patch::Set(vec![
                LinePatch::new(split.lines[0].id).account(savings.id),
            ])),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransactionLines(_)));
}

#[tokio::test]
async fn transfer_writes_a_balanced_pair() {
    let (engine, _db, user_id, budget_id, checking) = engine_with_budget().await;
    let savings = engine
        .new_account(budget_id, user_id, "Savings", "savings", None)
        .await
        .unwrap();

    let tx = engine
        .create_transfer(
            CreateTransferCmd::new(budget_id, user_id, checking, savings.id, 750).memo("to stash"),
        )
        .await
        .unwrap();

    assert_eq!(tx.lines.len(), 2);
    let from = tx.lines.iter().find(|l| l.account_id == checking).unwrap();
    let to = tx.lines.iter().find(|l| l.account_id == savings.id).unwrap();
    assert_eq!(from.amount_minor, -750);
    assert_eq!(to.amount_minor, 750);
    assert_eq!(from.memo.as_deref(), Some("to stash"));
    assert!(from.category_id.is_none() && to.category_id.is_none());

    // A negative amount flips the direction literally.
    let tx = engine
        .create_transfer(CreateTransferCmd::new(
            budget_id, user_id, checking, savings.id, -250,
        ))
        .await
        .unwrap();
    let from = tx.lines.iter().find(|l| l.account_id == checking).unwrap();
    let to = tx.lines.iter().find(|l| l.account_id == savings.id).unwrap();
    assert_eq!(from.amount_minor, 250);
    assert_eq!(to.amount_minor, -250);
}

#[tokio::test]
async fn transfer_rejects_same_account_and_payees() {
    let (engine, _db, user_id, budget_id, checking) = engine_with_budget().await;
    let savings = engine
        .new_account(budget_id, user_id, "Savings", "savings", None)
        .await
        .unwrap();
    let payee = engine
        .new_payee(budget_id, user_id, "Landlord")
        .await
        .unwrap();

    let err = engine
        .create_transfer(CreateTransferCmd::new(
            budget_id, user_id, checking, checking, 100,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TransferAccountsMustDiffer);

    let err = engine
        .create_transfer(
            CreateTransferCmd::new(budget_id, user_id, checking, savings.id, 100).payee(payee.id),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PayeeNotAllowedForTransfers);

    // i64::MIN cannot be mirrored onto the destination line.
    let err = engine
        .create_transfer(CreateTransferCmd::new(
            budget_id,
            user_id,
            checking,
            savings.id,
            i64::MIN,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidTransactionLines("transfer amount out of range".to_string())
    );
}

#[tokio::test]
async fn split_replaces_the_whole_line_set() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;
    let food = engine
        .new_category(budget_id, user_id, "Food", None, None)
        .await
        .unwrap();

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -300),
        ))
        .await
        .unwrap();
    let old_line = tx.lines[0].id;

    let split = engine
        .split_transaction(SplitTransactionCmd {
            budget_id,
            transaction_id: tx.id,
            user_id,
            lines: vec![
                NewLine::new(account_id, -100).category(food.id),
                NewLine::new(account_id, -200),
            ],
        })
        .await
        .unwrap();

    assert_eq!(split.lines.len(), 2);
    assert!(split.lines.iter().all(|l| l.id != old_line));
    assert!(split.lines.iter().any(|l| l.category_id == Some(food.id)));
}

#[tokio::test]
async fn split_rejects_transfers_and_multi_account_sets() {
    let (engine, _db, user_id, budget_id, checking) = engine_with_budget().await;
    let savings = engine
        .new_account(budget_id, user_id, "Savings", "savings", None)
        .await
        .unwrap();

    let transfer = engine
        .create_transfer(CreateTransferCmd::new(
            budget_id, user_id, checking, savings.id, 500,
        ))
        .await
        .unwrap();
    let err = engine
        .split_transaction(SplitTransactionCmd {
            budget_id,
            transaction_id: transfer.id,
            user_id,
            lines: vec![NewLine::new(checking, -500)],
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TransferCannotBeSplit);

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(checking, -300),
        ))
        .await
        .unwrap();
    let err = engine
        .split_transaction(SplitTransactionCmd {
            budget_id,
            transaction_id: tx.id,
            user_id,
            lines: vec![
                NewLine::new(checking, -100),
                NewLine::new(savings.id, -200),
            ],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransactionLines(_)));

    let err = engine
        .split_transaction(SplitTransactionCmd {
            budget_id,
            transaction_id: tx.id,
            user_id,
            lines: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransactionLines(_)));
}

#[tokio::test]
async fn delete_removes_the_transaction_and_its_lines() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;
    let tag = engine.new_tag(budget_id, user_id, "once").await.unwrap();

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100).tags(vec![tag.id]),
        ))
        .await
        .unwrap();

    engine
        .delete_transaction(budget_id, tx.id, user_id)
        .await
        .unwrap();

    let err = engine
        .transaction(budget_id, tx.id, user_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TransactionNotFound(tx.id.to_string()));

    // The account is free again once nothing references it.
    engine
        .delete_account(budget_id, account_id, user_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn list_orders_newest_first() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let base = Utc::now();
    let oldest = engine
        .create_transaction(
            CreateTransactionCmd::new(budget_id, user_id, NewLine::new(account_id, -1))
                .posted_at(base - Duration::hours(2)),
        )
        .await
        .unwrap();
    let newest = engine
        .create_transaction(
            CreateTransactionCmd::new(budget_id, user_id, NewLine::new(account_id, -2))
                .posted_at(base),
        )
        .await
        .unwrap();
    let middle = engine
        .create_transaction(
            CreateTransactionCmd::new(budget_id, user_id, NewLine::new(account_id, -3))
                .posted_at(base - Duration::hours(1)),
        )
        .await
        .unwrap();

    let listed = engine.list_transactions(budget_id, user_id).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
}

#[tokio::test]
async fn non_members_see_nothing() {
    let (engine, db, user_id, budget_id, account_id) = engine_with_budget().await;
    let outsider = seed_user(&db, "mallory@example.com").await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            user_id,
            NewLine::new(account_id, -100),
        ))
        .await
        .unwrap();

    let err = engine
        .transaction(budget_id, tx.id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::BudgetNotFound(budget_id.to_string()));

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            outsider,
            NewLine::new(account_id, -100),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::BudgetNotFound(budget_id.to_string()));
}
