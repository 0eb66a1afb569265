//! Core transaction domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Amount, TransactionType,
    auth::UserID,
    category::{CategoryId, CategoryName},
    database_id::DatabaseId,
    json::{deserialize_some, iso_date, rfc3339},
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// An income or expense of a user, along with the name and type of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The owner of the transaction.
    #[serde(rename = "user")]
    pub user_id: UserID,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Amount,
    /// The ID of the category.
    pub category: CategoryId,
    pub category_name: CategoryName,
    pub category_type: TransactionType,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub description: Option<String>,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub created_at: OffsetDateTime,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub updated_at: OffsetDateTime,
}

/// The validated data needed to insert or replace a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The owner of the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// How much money was earned or spent.
    pub amount: Amount,
    /// A category of the owner, for the same transaction type.
    pub category_id: CategoryId,
    /// When the money was earned or spent.
    pub date: Date,
    /// Free text describing the transaction.
    pub description: Option<String>,
}

/// The body of create, update and partial update requests for transactions.
///
/// Fields are optional so that missing fields can be reported per field, and
/// so that partial updates can leave them unchanged.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// `Some(None)` is an explicit `null`, which is rejected.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<CategoryId>>,
    /// The date as a `YYYY-MM-DD` string.
    #[serde(default)]
    pub date: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}
