use anyhow::Result;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BudgetAlert, BudgetAlertFilter, Category, Query};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BudgetFilter {
    pub id: Option<u32>,
    pub user_id: Option<u32>,
    pub category: Option<Category>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// A monthly spending limit for one category.
///
/// At most one budget exists per (user, category, month, year).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: u32,
    pub user_id: u32,
    pub category: Category,
    pub limit: Decimal,
    pub month: u32,
    pub year: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Budget {
    /// Get the alerts raised against this budget
    pub async fn get_alerts<DB>(&self, db: &DB) -> Result<Vec<BudgetAlert>>
    where
        DB: Query<BudgetAlert, Filter = BudgetAlertFilter>,
    {
        let alerts = db
            .query(&BudgetAlertFilter {
                budget_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(alerts)
    }
}
