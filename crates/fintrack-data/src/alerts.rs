use anyhow::Result;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AlertLevel, Budget, Retrieve};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BudgetAlertFilter {
    pub id: Option<u32>,
    pub user_id: Option<u32>,
    pub budget_id: Option<u32>,
    pub level: Option<AlertLevel>,
    pub is_read: Option<bool>,
}

/// A materialized notification that spending crossed a budget
/// threshold.
///
/// The spent amount and percentage are a snapshot taken when the
/// threshold was first crossed. At most one alert exists per
/// (user, budget, level); later evaluations leave it untouched.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: u32,
    pub user_id: u32,
    pub budget_id: u32,
    pub level: AlertLevel,
    pub spent_amount: Decimal,
    pub percentage: Decimal,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl BudgetAlert {
    /// Get the budget this alert refers to
    pub async fn get_budget<DB>(&self, db: &DB) -> Result<Budget>
    where
        DB: Retrieve<Budget, Key = u32>,
    {
        db.retrieve(self.budget_id).await
    }
}
