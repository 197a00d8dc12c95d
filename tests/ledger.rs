//! Ledger queries and the daily accrual pass against a real PostgreSQL.
//!
//! `#[sqlx::test]` creates a throwaway database per test from
//! `DATABASE_URL` and applies `migrations/` before the test body runs.

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tower::ServiceExt;

use deposit_ledger_bot::{
    config::Catalog,
    error::AppError,
    handlers,
    models::account::{Currency, DepositRecord, DepositorDetails, UsdtNetwork},
    services::{account_service, accrual},
};

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"{"plans": [
            {"key": "plan_2", "title": "Second Plan", "equity_range": "$1,000 - $4,999",
             "daily_rate_bps": 3000, "deposit_cents": 100000},
            {"key": "slow", "title": "Slow", "equity_range": "any",
             "daily_rate_bps": 50, "deposit_cents": 10000}
        ]}"#,
    )
    .unwrap()
}

fn dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn record(plan_key: &str, deposit: Decimal) -> DepositRecord {
    DepositRecord {
        plan_key: plan_key.to_string(),
        currency: Currency::Usdt,
        network: Some(UsdtNetwork::Trc20),
        txid: "tx-1".to_string(),
        deposit,
    }
}

async fn balances(pool: &PgPool, telegram_id: i64) -> (Decimal, Decimal) {
    let account = account_service::find_account(pool, telegram_id)
        .await
        .unwrap()
        .unwrap();
    (account.deposit, account.profit)
}

#[sqlx::test]
async fn first_write_creates_the_account(pool: PgPool) {
    assert!(account_service::find_account(&pool, 1).await.unwrap().is_none());
    assert_eq!(account_service::language_of(&pool, 1).await.unwrap(), "en");

    let account = account_service::set_language(&pool, 1, "de").await.unwrap();
    assert_eq!(account.language, "de");
    assert_eq!(account.deposit, Decimal::ZERO);
    assert!(!account.compound);

    account_service::set_language(&pool, 1, "fr").await.unwrap();
    assert_eq!(account_service::language_of(&pool, 1).await.unwrap(), "fr");
    assert_eq!(account_service::list_accounts(&pool).await.unwrap().len(), 1);
}

#[sqlx::test]
async fn deposit_dialog_writes_are_upserts(pool: PgPool) {
    let details = DepositorDetails {
        full_name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        country: "UK".into(),
        payout_address: "payout-1".into(),
    };
    let account = account_service::save_depositor_details(&pool, 2, "plan_2", &details)
        .await
        .unwrap();
    assert_eq!(account.wallet_address.as_deref(), Some("payout-1"));
    assert_eq!(account.selected_plan.as_deref(), Some("plan_2"));

    let account = account_service::record_deposit(&pool, 2, &record("plan_2", dollars(100_000)))
        .await
        .unwrap();
    assert_eq!(account.currency(), Some(Currency::Usdt));
    assert_eq!(account.network(), Some(UsdtNetwork::Trc20));
    assert_eq!(account.txid.as_deref(), Some("tx-1"));
    assert_eq!(account.deposit, dollars(100_000));
    assert_eq!(account.full_name.as_deref(), Some("Ada Lovelace"));

    let account = account_service::set_wallet_address(&pool, 2, "wallet-9")
        .await
        .unwrap();
    assert_eq!(account.wallet_address.as_deref(), Some("wallet-9"));

    // a wallet address alone also creates the row
    account_service::set_wallet_address(&pool, 3, "wallet-3")
        .await
        .unwrap();
    assert_eq!(account_service::list_accounts(&pool).await.unwrap().len(), 2);
}

#[sqlx::test]
async fn compounding_toggle_needs_an_account(pool: PgPool) {
    assert_eq!(account_service::toggle_compound(&pool, 4).await.unwrap(), None);
    assert!(account_service::find_account(&pool, 4).await.unwrap().is_none());

    account_service::set_language(&pool, 4, "en").await.unwrap();
    assert_eq!(account_service::toggle_compound(&pool, 4).await.unwrap(), Some(true));
    assert_eq!(account_service::toggle_compound(&pool, 4).await.unwrap(), Some(false));
}

#[sqlx::test]
async fn overrides_of_unknown_users_are_not_found(pool: PgPool) {
    assert!(matches!(
        account_service::set_balance(&pool, 5, dollars(100), Decimal::ZERO).await,
        Err(AppError::AccountNotFound)
    ));
    assert!(matches!(
        account_service::override_plan(&pool, 5, "plan_2", dollars(100)).await,
        Err(AppError::AccountNotFound)
    ));
    assert!(matches!(
        account_service::set_balance(&pool, 5, dollars(-1), Decimal::ZERO).await,
        Err(AppError::InvalidArguments)
    ));
    assert!(account_service::find_account(&pool, 5).await.unwrap().is_none());
}

#[sqlx::test]
async fn accrual_skips_accounts_without_plan_or_principal(pool: PgPool) {
    // no plan
    account_service::set_language(&pool, 10, "en").await.unwrap();
    account_service::set_balance(&pool, 10, dollars(100_000), Decimal::ZERO)
        .await
        .unwrap();
    // plan but nothing deposited
    account_service::record_deposit(&pool, 11, &record("plan_2", Decimal::ZERO))
        .await
        .unwrap();
    // plan no longer in the catalog
    account_service::record_deposit(&pool, 12, &record("retired", dollars(100_000)))
        .await
        .unwrap();
    account_service::record_deposit(&pool, 13, &record("plan_2", dollars(100_000)))
        .await
        .unwrap();

    let summary = accrual::run_daily_accrual(&pool, &catalog()).await.unwrap();

    assert_eq!(summary.credited, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total_increment, dollars(30_000));
    assert_eq!(balances(&pool, 10).await, (dollars(100_000), Decimal::ZERO));
    assert_eq!(balances(&pool, 11).await, (Decimal::ZERO, Decimal::ZERO));
    assert_eq!(balances(&pool, 12).await, (dollars(100_000), Decimal::ZERO));
    assert_eq!(balances(&pool, 13).await, (dollars(100_000), dollars(30_000)));
}

#[sqlx::test]
async fn compounding_is_exact_across_committed_passes(pool: PgPool) {
    account_service::record_deposit(&pool, 20, &record("slow", dollars(10_000)))
        .await
        .unwrap();
    account_service::toggle_compound(&pool, 20).await.unwrap();

    let catalog = catalog();
    accrual::run_daily_accrual(&pool, &catalog).await.unwrap();
    accrual::run_daily_accrual(&pool, &catalog).await.unwrap();

    assert_eq!(
        balances(&pool, 20).await,
        (Decimal::new(1_010_025, 4), Decimal::new(10_025, 4))
    );
}

#[sqlx::test]
async fn overridden_balance_feeds_the_next_pass(pool: PgPool) {
    account_service::record_deposit(&pool, 30, &record("plan_2", dollars(100_000)))
        .await
        .unwrap();
    account_service::set_balance(&pool, 30, dollars(500_000), dollars(1_000))
        .await
        .unwrap();

    accrual::run_daily_accrual(&pool, &catalog()).await.unwrap();

    assert_eq!(balances(&pool, 30).await, (dollars(500_000), dollars(151_000)));

    let account = account_service::override_plan(&pool, 30, "slow", dollars(20_000))
        .await
        .unwrap();
    assert_eq!(account.selected_plan.as_deref(), Some("slow"));

    accrual::run_daily_accrual(&pool, &catalog()).await.unwrap();
    assert_eq!(balances(&pool, 30).await, (dollars(20_000), dollars(151_100)));
}

#[sqlx::test]
async fn stats_sum_all_accounts(pool: PgPool) {
    let empty = account_service::account_stats(&pool).await.unwrap();
    assert_eq!(empty.total_users, 0);
    assert_eq!(empty.total_deposit, Decimal::ZERO);

    account_service::record_deposit(&pool, 40, &record("plan_2", dollars(100_000)))
        .await
        .unwrap();
    account_service::record_deposit(&pool, 41, &record("slow", dollars(10_050)))
        .await
        .unwrap();
    accrual::run_daily_accrual(&pool, &catalog()).await.unwrap();

    let stats = account_service::account_stats(&pool).await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_deposit, dollars(110_050));
    // 300.00 + 100.50 * 0.005
    assert_eq!(stats.total_profit, Decimal::new(3_005_025, 4));
}

#[sqlx::test]
async fn health_reports_the_ledger(pool: PgPool) {
    account_service::set_language(&pool, 50, "en").await.unwrap();

    let response = handlers::router(pool)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["accounts"], 1);
}
