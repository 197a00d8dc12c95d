//! Daily profit accrual.
//!
//! Once per day every funded account earns its plan's daily rate:
//!
//! ```text
//! increment = deposit * rate                    (exact, no rounding)
//! profit   += increment
//! deposit  += increment                         (only when compounding)
//! ```
//!
//! Balances keep every digit of the product; they are rounded to cents only
//! for display. The whole pass runs in one database transaction. Any error
//! aborts it and the uncommitted transaction is rolled back when dropped.

use rust_decimal::Decimal;

use crate::{config::Catalog, db::DbPool, error::AppError, models::account::Account};

/// Result of one accrual step on a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    pub deposit: Decimal,
    pub profit: Decimal,
    pub increment: Decimal,
}

/// Why an account was left untouched, or how much it earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Credited(Decimal),
    NoPlan,
    NoPrincipal,
    UnknownPlan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccrualSummary {
    pub credited: usize,
    pub skipped: usize,
    pub total_increment: Decimal,
}

impl AccrualSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Credited(increment) => {
                self.credited += 1;
                self.total_increment = self.total_increment.saturating_add(increment);
            }
            Outcome::NoPlan | Outcome::NoPrincipal | Outcome::UnknownPlan => self.skipped += 1,
        }
    }
}

/// One accrual step on raw balances. Returns `None` when there is no
/// principal to earn on.
pub fn accrue(deposit: Decimal, profit: Decimal, rate: Decimal, compound: bool) -> Option<Accrual> {
    if deposit <= Decimal::ZERO {
        return None;
    }

    let increment = deposit.saturating_mul(rate.max(Decimal::ZERO));
    let profit = profit.saturating_add(increment);
    let deposit = if compound {
        deposit.saturating_add(increment)
    } else {
        deposit
    };

    Some(Accrual {
        deposit,
        profit,
        increment,
    })
}

/// Apply one accrual step to an account in memory.
pub fn accrue_account(account: &mut Account, catalog: &Catalog) -> Outcome {
    let Some(plan_key) = account.selected_plan.as_deref() else {
        return Outcome::NoPlan;
    };
    let Some(plan) = catalog.plan(plan_key) else {
        return Outcome::UnknownPlan;
    };
    let Some(step) = accrue(account.deposit, account.profit, plan.rate(), account.compound) else {
        return Outcome::NoPrincipal;
    };

    account.deposit = step.deposit;
    account.profit = step.profit;
    Outcome::Credited(step.increment)
}

/// One accrual pass over in-memory accounts.
pub fn apply_pass(accounts: &mut [Account], catalog: &Catalog) -> AccrualSummary {
    let mut summary = AccrualSummary::default();
    for account in accounts.iter_mut() {
        summary.record(accrue_account(account, catalog));
    }
    summary
}

/// Run the daily accrual over every funded account in one transaction.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Lock all accounts with a plan and a positive deposit
/// 3. Compute and write each account's new balances
/// 4. Commit (or roll back on error)
pub async fn run_daily_accrual(pool: &DbPool, catalog: &Catalog) -> Result<AccrualSummary, AppError> {
    let mut tx = pool.begin().await?;

    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT * FROM accounts
        WHERE selected_plan IS NOT NULL AND deposit > 0
        ORDER BY telegram_id
        FOR UPDATE
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut summary = AccrualSummary::default();
    for mut account in accounts {
        let outcome = accrue_account(&mut account, catalog);
        if outcome == Outcome::UnknownPlan {
            tracing::warn!(
                telegram_id = account.telegram_id,
                plan = ?account.selected_plan,
                "Skipping accrual for account with unknown plan"
            );
        }

        if let Outcome::Credited(_) = outcome {
            sqlx::query(
                r#"
                UPDATE accounts
                SET deposit = $1,
                    profit = $2,
                    updated_at = NOW()
                WHERE telegram_id = $3
                "#,
            )
            .bind(account.deposit)
            .bind(account.profit)
            .bind(account.telegram_id)
            .execute(&mut *tx)
            .await?;
        }
        summary.record(outcome);
    }

    tx.commit().await?;

    Ok(summary)
}
