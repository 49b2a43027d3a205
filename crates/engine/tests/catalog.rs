use engine::{CreateTransactionCmd, EngineError, NewLine, Patch, UpdateCategoryCmd};
use uuid::Uuid;

mod common;
use common::{engine_with_budget, engine_with_db, seed_user};

#[tokio::test]
async fn budget_creation_validates_currency_and_name() {
    let (engine, db) = engine_with_db().await;
    let user_id = seed_user(&db, "alice@example.com").await;

    let budget = engine.new_budget("Main", "eur", user_id).await.unwrap();
    assert_eq!(budget.base_currency_code, "EUR");

    let err = engine.new_budget("Side", "XXX", user_id).await.unwrap_err();
    assert_eq!(err, EngineError::CurrencyNotFound("XXX".to_string()));

    let err = engine.new_budget("   ", "EUR", user_id).await.unwrap_err();
    assert_eq!(err, EngineError::EmptyName("budget".to_string()));

    let listed = engine.list_budgets(user_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, budget.id);
}

#[tokio::test]
async fn currency_lookup_normalizes_the_code() {
    let (engine, _db) = engine_with_db().await;

    let eur = engine.get_currency(" eur ").await.unwrap();
    assert_eq!(eur.code, "EUR");
    assert_eq!(eur.minor_unit, 2);

    let yen = engine.get_currency("JPY").await.unwrap();
    assert_eq!(yen.minor_unit, 0);

    let err = engine.get_currency("XXX").await.unwrap_err();
    assert_eq!(err, EngineError::CurrencyNotFound("XXX".to_string()));
}

#[tokio::test]
async fn currency_listing_returns_the_reference_table_sorted() {
    let (engine, _db) = engine_with_db().await;

    let listed = engine.list_currencies().await.unwrap();
    let codes: Vec<_> = listed.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["CHF", "EUR", "GBP", "JPY", "USD"]);
    assert!(listed.iter().all(|c| !c.name.is_empty()));
}

#[tokio::test]
async fn base_currency_locks_once_accounts_exist() {
    let (engine, _db, user_id, budget_id, _account_id) = engine_with_budget().await;

    let err = engine
        .update_budget(budget_id, user_id, None, Some("USD"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CurrencyLocked);

    // Renaming alone still works, and so does re-stating the same currency.
    let budget = engine
        .update_budget(budget_id, user_id, Some("Household"), None)
        .await
        .unwrap();
    assert_eq!(budget.name, "Household");
    engine
        .update_budget(budget_id, user_id, None, Some("eur"))
        .await
        .unwrap();

    let err = engine
        .update_budget(budget_id, user_id, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoFieldsToUpdate);
}

#[tokio::test]
async fn membership_is_owner_managed() {
    let (engine, db, owner, budget_id, _account_id) = engine_with_budget().await;
    let bob = seed_user(&db, "bob@example.com").await;

    let err = engine
        .add_budget_member(budget_id, owner, "nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UserNotFound("nobody@example.com".to_string()));

    let member = engine
        .add_budget_member(budget_id, owner, "Bob@Example.com")
        .await
        .unwrap();
    assert_eq!(member.user_id, bob);

    let err = engine
        .add_budget_member(budget_id, owner, "bob@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict("bob@example.com".to_string()));

    // Members can read the roster but cannot manage it.
    let members = engine.list_budget_members(budget_id, bob).await.unwrap();
    assert_eq!(members.len(), 2);
    let err = engine
        .add_budget_member(budget_id, bob, "bob@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .remove_budget_member(budget_id, owner, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .remove_budget_member(budget_id, owner, bob)
        .await
        .unwrap();
    let err = engine.budget(budget_id, bob).await.unwrap_err();
    assert_eq!(err, EngineError::BudgetNotFound(budget_id.to_string()));
}

#[tokio::test]
async fn budget_deletion_is_owner_only_and_sweeps_everything_scoped() {
    let (engine, db, owner, budget_id, account_id) = engine_with_budget().await;
    let bob = seed_user(&db, "bob@example.com").await;
    engine
        .add_budget_member(budget_id, owner, "bob@example.com")
        .await
        .unwrap();

    // Populate every scoped table so the sweep has real rows to clear.
    let rent = engine
        .new_category(budget_id, owner, "Rent", None, None)
        .await
        .unwrap();
    let landlord = engine.new_payee(budget_id, owner, "Landlord").await.unwrap();
    let urgent = engine.new_tag(budget_id, owner, "urgent").await.unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            budget_id,
            owner,
            NewLine::new(account_id, -120_000)
                .category(rent.id)
                .payee(landlord.id)
                .tags(vec![urgent.id]),
        ))
        .await
        .unwrap();

    let err = engine.delete_budget(budget_id, bob).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_budget(budget_id, owner).await.unwrap();

    let err = engine.budget(budget_id, owner).await.unwrap_err();
    assert_eq!(err, EngineError::BudgetNotFound(budget_id.to_string()));
    assert!(engine.list_budgets(owner).await.unwrap().is_empty());
    assert!(engine.list_budgets(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn account_names_are_unique_per_budget_ignoring_case() {
    let (engine, _db, user_id, budget_id, _account_id) = engine_with_budget().await;

    let err = engine
        .new_account(budget_id, user_id, "  checking ", "cash", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict("checking".to_string()));

    let err = engine
        .new_account(budget_id, user_id, "Wallet", "petty_cash", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidAccountType("petty_cash".to_string()));

    let err = engine
        .new_account(budget_id, user_id, "Wallet", "cash", Some("USD"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));

    let wallet = engine
        .new_account(budget_id, user_id, "Wallet", "cash", Some("eur"))
        .await
        .unwrap();
    assert_eq!(wallet.currency_code, "EUR");
}

#[tokio::test]
async fn account_updates_and_deletes() {
    let (engine, _db, user_id, budget_id, account_id) = engine_with_budget().await;

    let account = engine
        .update_account(budget_id, account_id, user_id, None, Some(false))
        .await
        .unwrap();
    assert!(!account.is_active);

    let err = engine
        .update_account(budget_id, account_id, user_id, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoFieldsToUpdate);

    let missing = Uuid::new_v4();
    let err = engine
        .update_account(budget_id, missing, user_id, Some("X"), None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AccountNotFound(missing.to_string()));

    engine
        .delete_account(budget_id, account_id, user_id)
        .await
        .unwrap();
    let err = engine.account(budget_id, account_id, user_id).await.unwrap_err();
    assert_eq!(err, EngineError::AccountNotFound(account_id.to_string()));
}

#[tokio::test]
async fn categories_nest_exactly_one_level() {
    let (engine, _db, user_id, budget_id, _account_id) = engine_with_budget().await;

    let food = engine
        .new_category(budget_id, user_id, "Food", None, None)
        .await
        .unwrap();
    let groceries = engine
        .new_category(budget_id, user_id, "Groceries", Some(food.id), Some(1))
        .await
        .unwrap();
    assert_eq!(groceries.parent_id, Some(food.id));

    let err = engine
        .new_category(budget_id, user_id, "Produce", Some(groceries.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CategoryDepthExceeded(_)));

    let err = engine
        .update_category(
            UpdateCategoryCmd::new(budget_id, food.id, user_id).parent(Patch::Set(food.id)),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CategoryOwnParent);

    // A category with children cannot itself become a child.
    let bills = engine
        .new_category(budget_id, user_id, "Bills", None, None)
        .await
        .unwrap();
    let err = engine
        .update_category(
            UpdateCategoryCmd::new(budget_id, food.id, user_id).parent(Patch::Set(bills.id)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CategoryDepthExceeded(_)));

    let detached = engine
        .update_category(
            UpdateCategoryCmd::new(budget_id, groceries.id, user_id).parent(Patch::Null),
        )
        .await
        .unwrap();
    assert_eq!(detached.parent_id, None);
}

#[tokio::test]
async fn category_listing_orders_by_sort_order_then_name() {
    let (engine, _db, user_id, budget_id, _account_id) = engine_with_budget().await;

    engine
        .new_category(budget_id, user_id, "Zebra", None, Some(0))
        .await
        .unwrap();
    engine
        .new_category(budget_id, user_id, "Apple", None, Some(0))
        .await
        .unwrap();
    engine
        .new_category(budget_id, user_id, "First", None, Some(-1))
        .await
        .unwrap();

    let listed = engine.list_categories(budget_id, user_id).await.unwrap();
    let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Apple", "Zebra"]);
}

#[tokio::test]
async fn payees_and_tags_rename_with_conflict_checks() {
    let (engine, _db, user_id, budget_id, _account_id) = engine_with_budget().await;

    let landlord = engine
        .new_payee(budget_id, user_id, "Landlord")
        .await
        .unwrap();
    let grocer = engine.new_payee(budget_id, user_id, "Grocer").await.unwrap();

    let err = engine
        .rename_payee(budget_id, grocer.id, user_id, "LANDLORD")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict("LANDLORD".to_string()));

    let renamed = engine
        .rename_payee(budget_id, grocer.id, user_id, "Market")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Market");

    engine
        .delete_payee(budget_id, landlord.id, user_id)
        .await
        .unwrap();
    let err = engine
        .payee(budget_id, landlord.id, user_id)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::PayeeNotFound(landlord.id.to_string()));

    let urgent = engine.new_tag(budget_id, user_id, "urgent").await.unwrap();
    let err = engine
        .new_tag(budget_id, user_id, " URGENT ")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict("URGENT".to_string()));

    let err = engine.new_tag(budget_id, user_id, "   ").await.unwrap_err();
    assert_eq!(err, EngineError::EmptyName("tag".to_string()));

    engine.delete_tag(budget_id, urgent.id, user_id).await.unwrap();
}
