//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, TransactionType, auth::UserID, database_id::DatabaseId, json::rfc3339};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// The categories every new user starts with.
pub const DEFAULT_CATEGORIES: [(&str, TransactionType); 12] = [
    ("Salary", TransactionType::Income),
    ("Freelance", TransactionType::Income),
    ("Investments", TransactionType::Income),
    ("Other Income", TransactionType::Income),
    ("Groceries", TransactionType::Expense),
    ("Rent", TransactionType::Expense),
    ("Utilities", TransactionType::Expense),
    ("Transportation", TransactionType::Expense),
    ("Entertainment", TransactionType::Expense),
    ("Healthcare", TransactionType::Expense),
    ("Dining Out", TransactionType::Expense),
    ("Shopping", TransactionType::Expense),
];

/// A validated, non-blank category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidField] if `name` is blank or
    /// longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::invalid_field("name", "This field may not be blank."));
        }

        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(Error::invalid_field(
                "name",
                format!(
                    "Ensure this field has no more than {MAX_CATEGORY_NAME_LENGTH} characters."
                ),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not blank.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// The owner of the category.
    #[serde(rename = "user")]
    pub user_id: UserID,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub created_at: OffsetDateTime,
}

/// The data needed to insert a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub category_type: TransactionType,
    pub user_id: UserID,
}

/// The body of create, update and partial update requests for categories.
///
/// Fields are optional so that missing fields can be reported per field, and
/// so that partial updates can leave them unchanged. Other fields, such as
/// `user`, are ignored.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub category_type: Option<String>,
}


#[cfg(test)]
mod category_serialization_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        TransactionType,
        auth::UserID,
        category::{Category, CategoryName},
    };

    #[test]
    fn serializes_with_api_field_names() {
        let category = Category {
            id: 3,
            name: CategoryName::new_unchecked("Rent"),
            category_type: TransactionType::Expense,
            user_id: UserID::new(7),
            created_at: datetime!(2024-02-01 12:00:00 UTC),
        };

        let value = serde_json::to_value(&category).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Rent",
                "type": "expense",
                "user": 7,
                "created_at": "2024-02-01T12:00:00Z",
            })
        );
    }
}
