//! Account service - every query touching the `accounts` table.
//!
//! Accounts are created lazily: the first write for a user inserts the row
//! and later writes update it (`INSERT ... ON CONFLICT DO UPDATE`). Each
//! function is one statement, committed on its own.

use rust_decimal::Decimal;

use crate::{
    db::DbPool,
    error::AppError,
    models::account::{Account, AccountStats, DepositRecord, DepositorDetails},
};

/// Language used for users that have not picked one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Fetch an account by Telegram user id.
pub async fn find_account(pool: &DbPool, telegram_id: i64) -> Result<Option<Account>, AppError> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_optional(pool)
        .await?;

    Ok(account)
}

/// Display language of a user, falling back to English for unknown users.
pub async fn language_of(pool: &DbPool, telegram_id: i64) -> Result<String, AppError> {
    let language: Option<String> =
        sqlx::query_scalar("SELECT language FROM accounts WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_optional(pool)
            .await?;

    Ok(language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()))
}

/// Store the display language, creating the account if needed.
pub async fn set_language(
    pool: &DbPool,
    telegram_id: i64,
    language: &str,
) -> Result<Account, AppError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (telegram_id, language)
        VALUES ($1, $2)
        ON CONFLICT (telegram_id) DO UPDATE
        SET language = EXCLUDED.language,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(telegram_id)
    .bind(language)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Persist depositor details together with the plan they were collected for.
///
/// The payout address given during details collection becomes the
/// account's wallet address; the last dialog step may replace it.
pub async fn save_depositor_details(
    pool: &DbPool,
    telegram_id: i64,
    plan_key: &str,
    details: &DepositorDetails,
) -> Result<Account, AppError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (telegram_id, full_name, email, country, wallet_address, selected_plan)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (telegram_id) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            email = EXCLUDED.email,
            country = EXCLUDED.country,
            wallet_address = EXCLUDED.wallet_address,
            selected_plan = EXCLUDED.selected_plan,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(telegram_id)
    .bind(&details.full_name)
    .bind(&details.email)
    .bind(&details.country)
    .bind(&details.payout_address)
    .bind(plan_key)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Record an accepted deposit: plan, currency, network, transaction id and
/// principal are written together.
pub async fn record_deposit(
    pool: &DbPool,
    telegram_id: i64,
    record: &DepositRecord,
) -> Result<Account, AppError> {
    if record.deposit.is_sign_negative() {
        return Err(AppError::InvalidArguments);
    }

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (
            telegram_id,
            selected_plan,
            selected_currency,
            usdt_network,
            txid,
            deposit
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (telegram_id) DO UPDATE
        SET selected_plan = EXCLUDED.selected_plan,
            selected_currency = EXCLUDED.selected_currency,
            usdt_network = EXCLUDED.usdt_network,
            txid = EXCLUDED.txid,
            deposit = EXCLUDED.deposit,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(telegram_id)
    .bind(&record.plan_key)
    .bind(record.currency.code())
    .bind(record.network.map(|n| n.code()))
    .bind(&record.txid)
    .bind(record.deposit)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Store the payout wallet address, creating the account if needed.
pub async fn set_wallet_address(
    pool: &DbPool,
    telegram_id: i64,
    wallet_address: &str,
) -> Result<Account, AppError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (telegram_id, wallet_address)
        VALUES ($1, $2)
        ON CONFLICT (telegram_id) DO UPDATE
        SET wallet_address = EXCLUDED.wallet_address,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(telegram_id)
    .bind(wallet_address)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Flip the compounding flag.
///
/// Returns the new value, or `None` when the user has no account (no row is
/// created in that case).
pub async fn toggle_compound(pool: &DbPool, telegram_id: i64) -> Result<Option<bool>, AppError> {
    let compound: Option<bool> = sqlx::query_scalar(
        r#"
        UPDATE accounts
        SET compound = NOT compound,
            updated_at = NOW()
        WHERE telegram_id = $1
        RETURNING compound
        "#,
    )
    .bind(telegram_id)
    .fetch_optional(pool)
    .await?;

    Ok(compound)
}

/// Administrator override of deposit and profit.
///
/// # Errors
///
/// - `InvalidArguments`: negative amount
/// - `AccountNotFound`: no account for this user
pub async fn set_balance(
    pool: &DbPool,
    telegram_id: i64,
    deposit: Decimal,
    profit: Decimal,
) -> Result<(), AppError> {
    if deposit.is_sign_negative() || profit.is_sign_negative() {
        return Err(AppError::InvalidArguments);
    }

    let updated = sqlx::query(
        r#"
        UPDATE accounts
        SET deposit = $1,
            profit = $2,
            updated_at = NOW()
        WHERE telegram_id = $3
        "#,
    )
    .bind(deposit)
    .bind(profit)
    .bind(telegram_id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::AccountNotFound);
    }

    Ok(())
}

/// Administrator override of the plan and principal of an existing account.
pub async fn override_plan(
    pool: &DbPool,
    telegram_id: i64,
    plan_key: &str,
    deposit: Decimal,
) -> Result<Account, AppError> {
    if deposit.is_sign_negative() {
        return Err(AppError::InvalidArguments);
    }

    sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET selected_plan = $1,
            deposit = $2,
            updated_at = NOW()
        WHERE telegram_id = $3
        RETURNING *
        "#,
    )
    .bind(plan_key)
    .bind(deposit)
    .bind(telegram_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::AccountNotFound)
}

/// All accounts, oldest first.
pub async fn list_accounts(pool: &DbPool) -> Result<Vec<Account>, AppError> {
    let accounts =
        sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at, telegram_id")
            .fetch_all(pool)
            .await?;

    Ok(accounts)
}

/// User count and summed balances for the admin dashboard.
pub async fn account_stats(pool: &DbPool) -> Result<AccountStats, AppError> {
    let stats = sqlx::query_as::<_, AccountStats>(
        r#"
        SELECT COUNT(*) AS total_users,
               COALESCE(SUM(deposit), 0) AS total_deposit,
               COALESCE(SUM(profit), 0) AS total_profit
        FROM accounts
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
