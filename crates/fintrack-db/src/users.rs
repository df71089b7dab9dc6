use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use fintrack_data::{
    Delete, Insert, Query, Retrieve, Update, User, UserFilter,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Query<User> for Connection {
    type Filter = UserFilter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<User>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                username,
                email,
                created_at
            FROM users
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(username) = filter.username.clone() {
            qry.push(" AND username = ").push_bind(username);
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email LIKE ").push_bind(email);
        }

        let rows = qry.build().fetch_all(&mut *conn).await?;
        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl Retrieve<User> for Connection {
    type Key = u32;
    async fn retrieve(&self, user_id: Self::Key) -> Result<User> {
        let filter = UserFilter {
            id: Some(user_id),
            ..Default::default()
        };
        let user = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(user)
    }
}

#[async_trait]
impl Insert<User> for Connection {
    async fn insert(&self, user: User) -> Result<User> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO users (
                    username,
                    email
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&user.username)
                .push_bind(&user.email);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<User> for Connection {
    async fn update(&self, user: User) -> Result<User> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE users SET")
                .push(" username = ")
                .push_bind(&user.username)
                .push(", email = ")
                .push_bind(&user.email)
                .push(" WHERE id = ")
                .push_bind(user.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(user.id).await
    }
}

#[async_trait]
impl Delete<User> for Connection {
    async fn delete(&self, user: User) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM users WHERE id = ")
            .push_bind(user.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
