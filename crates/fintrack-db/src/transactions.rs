use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use fintrack_data::{
    Delete, Insert, Query, Retrieve, Transaction, TransactionFilter, Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let kind: String = row.try_get("kind")?;
    let category: String = row.try_get("category")?;
    let amount: String = row.try_get("amount")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind: kind.parse()?,
        category: category.parse()?,
        amount: Decimal::from_str(&amount)?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Query<Transaction> for Connection {
    type Filter = TransactionFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Transaction>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                user_id,
                kind,
                category,
                amount,
                description,
                date,
                created_at,
                updated_at
            FROM transactions
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(user_id) = filter.user_id {
            qry.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(kind) = filter.kind {
            qry.push(" AND kind = ").push_bind(kind.to_string());
        }
        if let Some(category) = filter.category {
            qry.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(date) = filter.date {
            qry.push(" AND date = ").push_bind(date);
        }
        if let Some(date_after) = filter.date_after {
            qry.push(" AND date >= ").push_bind(date_after);
        }
        if let Some(date_before) = filter.date_before {
            qry.push(" AND date <= ").push_bind(date_before);
        }
        qry.push(" ORDER BY date DESC, created_at DESC");

        let rows = qry.build().fetch_all(&mut *conn).await?;
        rows.iter().map(transaction_from_row).collect()
    }
}

#[async_trait]
impl Retrieve<Transaction> for Connection {
    type Key = u32;
    async fn retrieve(&self, transaction_id: Self::Key) -> Result<Transaction> {
        let filter = TransactionFilter {
            id: Some(transaction_id),
            ..Default::default()
        };
        let transaction = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(transaction)
    }
}

#[async_trait]
impl Insert<Transaction> for Connection {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO transactions (
                    user_id,
                    kind,
                    category,
                    amount,
                    description,
                    date
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(transaction.user_id)
                .push_bind(transaction.kind.to_string())
                .push_bind(transaction.category.to_string())
                .push_bind(transaction.amount.to_string())
                .push_bind(&transaction.description)
                .push_bind(transaction.date);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Transaction> for Connection {
    async fn update(&self, transaction: Transaction) -> Result<Transaction> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE transactions SET")
                .push(" kind = ")
                .push_bind(transaction.kind.to_string())
                .push(", category = ")
                .push_bind(transaction.category.to_string())
                .push(", amount = ")
                .push_bind(transaction.amount.to_string())
                .push(", description = ")
                .push_bind(&transaction.description)
                .push(", date = ")
                .push_bind(transaction.date)
                .push(", updated_at = datetime('now')")
                .push(" WHERE id = ")
                .push_bind(transaction.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(transaction.id).await
    }
}

#[async_trait]
impl Delete<Transaction> for Connection {
    async fn delete(&self, transaction: Transaction) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM transactions WHERE id = ")
            .push_bind(transaction.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
