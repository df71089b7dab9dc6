pub mod alerts;
pub mod datetime;
pub mod stats;
