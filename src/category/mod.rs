//! Categories group transactions by what the money was earned or spent on.
//!
//! Each user has their own set of categories, seeded with defaults at
//! registration. A category is either for income or for expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod validation;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, get_category, get_user_category, list_categories,
    seed_default_categories,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, NewCategory};
pub use edit::{patch_category_endpoint, update_category_endpoint};
pub use list::{get_category_endpoint, list_categories_endpoint};
pub(crate) use list::{parse_category_filter, parse_type_filter};
pub use validation::resolve_category_reference;
