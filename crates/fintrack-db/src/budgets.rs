use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use fintrack_data::{
    Budget, BudgetFilter, Delete, Insert, Query, Retrieve, Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

fn budget_from_row(row: &SqliteRow) -> Result<Budget> {
    let category: String = row.try_get("category")?;
    let limit: String = row.try_get("limit_amount")?;
    Ok(Budget {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        category: category.parse()?,
        limit: Decimal::from_str(&limit)?,
        month: row.try_get("month")?,
        year: row.try_get("year")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Query<Budget> for Connection {
    type Filter = BudgetFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Budget>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                user_id,
                category,
                limit_amount,
                month,
                year,
                created_at,
                updated_at
            FROM budgets
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(user_id) = filter.user_id {
            qry.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(category) = filter.category {
            qry.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(month) = filter.month {
            qry.push(" AND month = ").push_bind(month);
        }
        if let Some(year) = filter.year {
            qry.push(" AND year = ").push_bind(year);
        }
        qry.push(" ORDER BY year DESC, month DESC, category");

        let rows = qry.build().fetch_all(&mut *conn).await?;
        rows.iter().map(budget_from_row).collect()
    }
}

#[async_trait]
impl Retrieve<Budget> for Connection {
    type Key = u32;
    async fn retrieve(&self, budget_id: Self::Key) -> Result<Budget> {
        let filter = BudgetFilter {
            id: Some(budget_id),
            ..Default::default()
        };
        let budget = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(budget)
    }
}

#[async_trait]
impl Insert<Budget> for Connection {
    async fn insert(&self, budget: Budget) -> Result<Budget> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO budgets (
                    user_id,
                    category,
                    limit_amount,
                    month,
                    year
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(budget.user_id)
                .push_bind(budget.category.to_string())
                .push_bind(budget.limit.to_string())
                .push_bind(budget.month)
                .push_bind(budget.year);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Budget> for Connection {
    async fn update(&self, budget: Budget) -> Result<Budget> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE budgets SET")
                .push(" limit_amount = ")
                .push_bind(budget.limit.to_string())
                .push(", updated_at = datetime('now')")
                .push(" WHERE id = ")
                .push_bind(budget.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(budget.id).await
    }
}

#[async_trait]
impl Delete<Budget> for Connection {
    async fn delete(&self, budget: Budget) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM budgets WHERE id = ")
            .push_bind(budget.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fintrack_data::{Category, User};

    async fn test_user(conn: &Connection) -> User {
        conn.insert(User {
            username: "erin".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_budget_insert_and_query() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;

        let budget = conn
            .insert(Budget {
                user_id: user.id,
                category: Category::Food,
                limit: Decimal::from(500),
                month: 1,
                year: 2024,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(budget.id > 0);
        assert_eq!(budget.limit, Decimal::from(500));

        let budgets: Vec<Budget> = conn
            .query(&BudgetFilter {
                user_id: Some(user.id),
                category: Some(Category::Food),
                month: Some(1),
                year: Some(2024),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(budgets.len(), 1);

        let budgets = user.get_budgets(&conn).await.unwrap();
        assert_eq!(budgets.len(), 1);
    }

    #[tokio::test]
    async fn test_budget_unique_per_month() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;

        let budget = Budget {
            user_id: user.id,
            category: Category::Food,
            limit: Decimal::from(500),
            month: 1,
            year: 2024,
            ..Default::default()
        };
        conn.insert(budget.clone()).await.unwrap();

        // Same (user, category, month, year) must be rejected
        assert!(conn.insert(budget.clone()).await.is_err());

        // A different month is fine
        conn.insert(Budget {
            month: 2,
            ..budget
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_budget_update_limit() {
        let (_handle, conn) = Connection::open_test().await;
        let user = test_user(&conn).await;

        let budget = conn
            .insert(Budget {
                user_id: user.id,
                category: Category::Food,
                limit: Decimal::from(500),
                month: 1,
                year: 2024,
                ..Default::default()
            })
            .await
            .unwrap();

        let budget = conn
            .update(Budget {
                limit: Decimal::from(750),
                ..budget
            })
            .await
            .unwrap();
        assert_eq!(budget.limit, Decimal::from(750));
    }
}
