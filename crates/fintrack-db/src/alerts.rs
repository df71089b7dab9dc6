use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};
use tracing::debug;

use fintrack_data::{
    BudgetAlert, BudgetAlertFilter, Query, Retrieve, Update, Upsert,
};

use crate::{
    results::QueryError,
    Connection,
};

fn alert_from_row(row: &SqliteRow) -> Result<BudgetAlert> {
    let level: String = row.try_get("alert_type")?;
    let spent_amount: String = row.try_get("spent_amount")?;
    let percentage: String = row.try_get("percentage")?;
    Ok(BudgetAlert {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        budget_id: row.try_get("budget_id")?,
        level: level.parse()?,
        spent_amount: Decimal::from_str(&spent_amount)?,
        percentage: Decimal::from_str(&percentage)?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Query<BudgetAlert> for Connection {
    type Filter = BudgetAlertFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<BudgetAlert>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                user_id,
                budget_id,
                alert_type,
                spent_amount,
                percentage,
                is_read,
                created_at
            FROM budget_alerts
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(user_id) = filter.user_id {
            qry.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(budget_id) = filter.budget_id {
            qry.push(" AND budget_id = ").push_bind(budget_id);
        }
        if let Some(level) = filter.level {
            qry.push(" AND alert_type = ").push_bind(level.to_string());
        }
        if let Some(is_read) = filter.is_read {
            qry.push(" AND is_read = ").push_bind(is_read);
        }
        qry.push(" ORDER BY created_at DESC");

        let rows = qry.build().fetch_all(&mut *conn).await?;
        rows.iter().map(alert_from_row).collect()
    }
}

#[async_trait]
impl Retrieve<BudgetAlert> for Connection {
    type Key = u32;
    async fn retrieve(&self, alert_id: Self::Key) -> Result<BudgetAlert> {
        let filter = BudgetAlertFilter {
            id: Some(alert_id),
            ..Default::default()
        };
        let alert = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(alert)
    }
}

/// The alert store only ever grows through the upsert: the insert
/// is atomic on the (user, budget, alert_type) unique key, so
/// concurrent evaluations of the same crossing cannot produce
/// duplicate rows or constraint failures.
#[async_trait]
impl Upsert<BudgetAlert> for Connection {
    async fn upsert(&self, alert: BudgetAlert) -> Result<BudgetAlert> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO budget_alerts (
                    user_id,
                    budget_id,
                    alert_type,
                    spent_amount,
                    percentage,
                    is_read
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(alert.user_id)
                .push_bind(alert.budget_id)
                .push_bind(alert.level.to_string())
                .push_bind(alert.spent_amount.to_string())
                .push_bind(alert.percentage.to_string())
                .push_bind(alert.is_read);

            qry.push(
                r#") ON CONFLICT (user_id, budget_id, alert_type)
                DO NOTHING"#,
            )
            .build()
            .execute(&mut *conn)
            .await?;
        }

        debug!(
            user_id = alert.user_id,
            budget_id = alert.budget_id,
            level = alert.level.as_str(),
            "ensured budget alert"
        );

        // Fetch whichever row now holds the key: the one just
        // created, or an earlier snapshot that was left untouched.
        let filter = BudgetAlertFilter {
            user_id: Some(alert.user_id),
            budget_id: Some(alert.budget_id),
            level: Some(alert.level),
            ..Default::default()
        };
        let alert = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(alert)
    }
}

#[async_trait]
impl Update<BudgetAlert> for Connection {
    /// Only the read flag is mutable; the snapshot fields are
    /// frozen at creation time.
    async fn update(&self, alert: BudgetAlert) -> Result<BudgetAlert> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE budget_alerts SET")
                .push(" is_read = ")
                .push_bind(alert.is_read)
                .push(" WHERE id = ")
                .push_bind(alert.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(alert.id).await
    }
}
