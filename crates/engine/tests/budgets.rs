use chrono::{TimeZone, Utc};
use sea_orm::Database;

use engine::{
    CreateBudgetCmd, CreateTransactionCmd, Engine, EngineError, Money, TransactionKind,
    UpdateBudgetCmd, YearMonth,
};
use migration::MigratorTrait;

async fn engine_with_user() -> (Engine, String) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().unwrap();
    let user = engine
        .create_user("alice@example.com", "Alice", "hash")
        .await
        .unwrap();
    (engine, user.id)
}

fn june() -> YearMonth {
    YearMonth::new(2025, 6).unwrap()
}

async fn spend(engine: &Engine, user: &str, category: &str, cents: i64, y: i32, m: u32, d: u32) {
    engine
        .create_transaction(
            CreateTransactionCmd::new(user, TransactionKind::Expense, category, Money::new(cents))
                .occurred_at(Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn summary_tracks_spend_against_limit() {
    let (engine, alice) = engine_with_user().await;

    spend(&engine, &alice, "Food", 500_00, 2025, 6, 10).await;
    let budget = engine
        .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(1000_00), june()))
        .await
        .unwrap();

    let summary = engine.budget_summary(&alice, june()).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].budget_id, budget.id);
    assert_eq!(summary[0].category, "Food");
    assert_eq!(summary[0].limit, Money::new(1000_00));
    assert_eq!(summary[0].spent, Money::new(500_00));
    assert_eq!(summary[0].remaining, Money::new(500_00));
    assert!(!summary[0].over_budget);

    spend(&engine, &alice, "Food", 600_00, 2025, 6, 20).await;

    let summary = engine.budget_summary(&alice, june()).await.unwrap();
    assert_eq!(summary[0].spent, Money::new(1100_00));
    assert_eq!(summary[0].remaining, Money::new(-100_00));
    assert!(summary[0].over_budget);
}

#[tokio::test]
async fn summary_ignores_other_months_and_income() {
    let (engine, alice) = engine_with_user().await;

    engine
        .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(100_00), june()))
        .await
        .unwrap();
    // Month boundaries are half-open in UTC.
    spend(&engine, &alice, "Food", 10_00, 2025, 5, 31).await;
    spend(&engine, &alice, "Food", 20_00, 2025, 7, 1).await;
    engine
        .create_transaction(
            CreateTransactionCmd::new(&alice, TransactionKind::Income, "Food", Money::new(999_00))
                .occurred_at(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()),
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            CreateTransactionCmd::new(&alice, TransactionKind::Expense, "Food", Money::new(5_00))
                .occurred_at(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        )
        .await
        .unwrap();

    let summary = engine.budget_summary(&alice, june()).await.unwrap();
    assert_eq!(summary[0].spent, Money::new(5_00));
}

#[tokio::test]
async fn summary_without_budgets_is_empty() {
    let (engine, alice) = engine_with_user().await;
    spend(&engine, &alice, "Food", 500, 2025, 6, 10).await;

    assert!(engine.budget_summary(&alice, june()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_scoped_to_month_newest_first() {
    let (engine, alice) = engine_with_user().await;

    let food = engine
        .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(100), june()))
        .await
        .unwrap();
    let rent = engine
        .create_budget(CreateBudgetCmd::new(&alice, "Rent", Money::new(200), june()))
        .await
        .unwrap();
    engine
        .create_budget(CreateBudgetCmd::new(
            &alice,
            "Food",
            Money::new(300),
            YearMonth::new(2025, 7).unwrap(),
        ))
        .await
        .unwrap();

    let listed = engine.list_budgets(&alice, Some(june())).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|b| b.id).collect();
    assert_eq!(ids, [rent.id, food.id]);
    assert_eq!(engine.list_budgets(&alice, None).await.unwrap().len(), 3);

    assert!(
        engine
            .list_budgets("someone-else", Some(june()))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn duplicates_are_allowed() {
    let (engine, alice) = engine_with_user().await;

    for limit in [100, 200] {
        engine
            .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(limit), june()))
            .await
            .unwrap();
    }
    assert_eq!(engine.list_budgets(&alice, Some(june())).await.unwrap().len(), 2);
    assert_eq!(engine.budget_summary(&alice, june()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_validates_category_and_limit() {
    let (engine, alice) = engine_with_user().await;

    assert!(matches!(
        engine
            .create_budget(CreateBudgetCmd::new(&alice, " ", Money::new(100), june()))
            .await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine
            .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(-1), june()))
            .await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine
            .create_budget(CreateBudgetCmd::new(
                &alice,
                "Food",
                Money::new(i64::MAX),
                june()
            ))
            .await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn update_and_delete_budget() {
    let (engine, alice) = engine_with_user().await;

    let budget = engine
        .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(100), june()))
        .await
        .unwrap();

    let july = YearMonth::new(2025, 7).unwrap();
    let updated = engine
        .update_budget(
            UpdateBudgetCmd::new(&alice, budget.id)
                .limit(Money::new(250))
                .month(july),
        )
        .await
        .unwrap();
    assert_eq!(updated.limit, Money::new(250));
    assert_eq!(updated.month, july);
    assert_eq!(updated.category, "Food");
    assert!(engine.list_budgets(&alice, Some(june())).await.unwrap().is_empty());

    let not_found = EngineError::KeyNotFound("Budget not found".to_string());
    assert_eq!(
        engine
            .update_budget(UpdateBudgetCmd::new("intruder", budget.id).limit(Money::new(1)))
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        engine.delete_budget("intruder", budget.id).await.unwrap_err(),
        not_found
    );

    engine.delete_budget(&alice, budget.id).await.unwrap();
    assert_eq!(
        engine.delete_budget(&alice, budget.id).await.unwrap_err(),
        not_found
    );
}

#[tokio::test]
async fn dashboard_combines_month_and_history() {
    let (engine, alice) = engine_with_user().await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(&alice, TransactionKind::Income, "Salary", Money::new(3000_00))
                .occurred_at(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()),
        )
        .await
        .unwrap();
    spend(&engine, &alice, "Food", 400_00, 2025, 6, 5).await;
    spend(&engine, &alice, "Rent", 1200_00, 2025, 6, 2).await;
    spend(&engine, &alice, "Food", 50_00, 2025, 5, 20).await;
    engine
        .create_budget(CreateBudgetCmd::new(&alice, "Food", Money::new(300_00), june()))
        .await
        .unwrap();

    let dashboard = engine.dashboard(&alice, june()).await.unwrap();
    assert_eq!(dashboard.month, june());
    assert_eq!(dashboard.income, Money::new(3000_00));
    assert_eq!(dashboard.expense, Money::new(1600_00));
    assert_eq!(dashboard.balance, Money::new(1400_00));

    let categories: Vec<_> = dashboard
        .categories
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    assert_eq!(
        categories,
        [("Rent", Money::new(1200_00)), ("Food", Money::new(400_00))]
    );

    // The trend covers the full history.
    assert_eq!(dashboard.monthly.len(), 2);
    assert_eq!(dashboard.monthly[0].expense, Money::new(50_00));

    assert_eq!(dashboard.budgets.len(), 1);
    assert_eq!(dashboard.budgets[0].spent, Money::new(400_00));
    assert!(dashboard.budgets[0].over_budget);
}

#[tokio::test]
async fn dashboard_for_empty_month_is_zeroed() {
    let (engine, alice) = engine_with_user().await;

    let dashboard = engine.dashboard(&alice, june()).await.unwrap();
    assert_eq!(dashboard.income, Money::ZERO);
    assert_eq!(dashboard.expense, Money::ZERO);
    assert_eq!(dashboard.balance, Money::ZERO);
    assert!(dashboard.categories.is_empty());
    assert!(dashboard.monthly.is_empty());
    assert!(dashboard.budgets.is_empty());
}
