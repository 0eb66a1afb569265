//! Rules that category writes, and references to categories, must satisfy.

use rusqlite::Connection;

use crate::{
    Error, TransactionType,
    auth::UserID,
    category::{
        Category, CategoryId, CategoryName,
        db::{category_name_exists, count_category_transactions, get_category},
    },
};

/// Check that `user_id` has no other category called `name`.
///
/// `exclude_id` is the category being updated, if any.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the name is taken.
pub fn validate_unique_name(
    user_id: UserID,
    name: &CategoryName,
    exclude_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    if category_name_exists(user_id, name, exclude_id, connection)? {
        return Err(Error::DuplicateCategoryName(name.to_string()));
    }

    Ok(())
}

/// Check that the type of `category` may change to `new_type`.
///
/// # Errors
///
/// Returns [Error::CategoryTypeLocked] if the type changes while transactions
/// reference the category.
pub fn validate_type_change(
    category: &Category,
    new_type: TransactionType,
    connection: &Connection,
) -> Result<(), Error> {
    if category.category_type == new_type {
        return Ok(());
    }

    if count_category_transactions(category.id, connection)? > 0 {
        return Err(Error::CategoryTypeLocked);
    }

    Ok(())
}

/// Look up the category that a transaction or budget refers to.
///
/// # Errors
///
/// Returns an [Error::InvalidField] for `category` if no category has the ID,
/// or [Error::CategoryNotOwned] if it belongs to another user.
pub fn resolve_category_reference(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = match get_category(category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => {
            return Err(Error::invalid_field(
                "category",
                format!("Invalid pk \"{category_id}\" - object does not exist."),
            ));
        }
        Err(error) => return Err(error),
    };

    if category.user_id != user_id {
        return Err(Error::CategoryNotOwned(category_id));
    }

    Ok(category)
}

#[cfg(test)]
mod category_validation_tests {
    use crate::{
        Error, TransactionType,
        category::CategoryName,
        test_utils::{create_test_category, create_test_user, get_test_connection},
    };

    use super::{resolve_category_reference, validate_type_change, validate_unique_name};

    #[test]
    fn unique_name_rejects_existing_name() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        create_test_category(&connection, &user, "Rent", TransactionType::Expense);

        let result = validate_unique_name(
            user.id,
            &CategoryName::new_unchecked("Rent"),
            None,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName("Rent".to_owned())));
    }

    #[test]
    fn type_change_allowed_without_transactions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let category = create_test_category(&connection, &user, "Misc", TransactionType::Expense);

        assert_eq!(
            validate_type_change(&category, TransactionType::Income, &connection),
            Ok(())
        );
    }

    #[test]
    fn reference_to_missing_category_is_field_error() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");

        let result = resolve_category_reference(42, user.id, &connection);

        assert_eq!(
            result,
            Err(Error::invalid_field(
                "category",
                "Invalid pk \"42\" - object does not exist."
            ))
        );
    }

    #[test]
    fn reference_to_other_users_category_is_rejected() {
        let connection = get_test_connection();
        let alice = create_test_user(&connection, "alice");
        let bob = create_test_user(&connection, "bob");
        let category = create_test_category(&connection, &bob, "Rent", TransactionType::Expense);

        let result = resolve_category_reference(category.id, alice.id, &connection);

        assert_eq!(result, Err(Error::CategoryNotOwned(category.id)));
    }
}
