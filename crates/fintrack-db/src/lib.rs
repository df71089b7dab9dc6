pub mod connection;
pub use connection::Connection;

pub mod results;
pub mod schema;

pub mod users;
pub mod transactions;
pub mod budgets;
pub mod alerts;
