// Operations
mod operations;
pub use operations::*;

// Enums
mod categories;
pub use categories::*;

// Models
mod users;
pub use users::*;

mod transactions;
pub use transactions::*;

mod budgets;
pub use budgets::*;

mod alerts;
pub use alerts::*;
