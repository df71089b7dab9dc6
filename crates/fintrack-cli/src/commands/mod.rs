mod users;
pub use users::*;

mod transactions;
pub use transactions::*;

mod budgets;
pub use budgets::*;

mod alerts;
pub use alerts::*;

mod reports;
pub use reports::*;
