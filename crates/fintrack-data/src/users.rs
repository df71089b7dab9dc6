use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    Budget, BudgetFilter, Query, Transaction, TransactionFilter,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserFilter {
    pub id: Option<u32>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Get all transactions recorded by this user
    pub async fn get_transactions<DB>(
        &self,
        db: &DB,
    ) -> Result<Vec<Transaction>>
    where
        DB: Query<Transaction, Filter = TransactionFilter>,
    {
        let transactions = db
            .query(&TransactionFilter {
                user_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(transactions)
    }

    /// Get all budgets this user has set up
    pub async fn get_budgets<DB>(&self, db: &DB) -> Result<Vec<Budget>>
    where
        DB: Query<Budget, Filter = BudgetFilter>,
    {
        let budgets = db
            .query(&BudgetFilter {
                user_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(budgets)
    }
}
