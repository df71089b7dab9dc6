use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::schema;

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl Connection {
    /// Open a connection to the database.
    /// The database file is created if it does not exist yet;
    /// the schema is only installed by `schema::install`.
    pub async fn open(filename: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&options).await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the underlying sqlite connection
    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }

    /// Open a new test database connection.
    /// The database will be created on each open and removed
    /// when the handle is dropped.
    pub async fn open_test() -> (TestHandle, Self) {
        let filename =
            format!("/tmp/fintrack_test_{}.sqlite3", rand::random::<u64>());
        let handle = TestHandle {
            filename: filename.clone(),
        };

        let conn = Self::open(&filename).await.unwrap();

        // Install the schema
        schema::install(&conn).await.unwrap();

        (handle, conn)
    }
}

pub struct TestHandle {
    filename: String,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            fs::remove_file(path).unwrap();
        }
    }
}
