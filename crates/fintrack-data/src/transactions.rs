use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Category, TransactionKind};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub id: Option<u32>,
    pub user_id: Option<u32>,
    pub kind: Option<TransactionKind>,
    pub category: Option<Category>,
    pub date: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
}

/// A dated income or expense record.
///
/// Amounts are always positive; the kind decides the direction.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u32,
    pub user_id: u32,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
