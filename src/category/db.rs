//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    category::{
        Category, CategoryName, CategoryType, EditCategoryForm, UNSPECIFIED_CATEGORY_NAME,
    },
    database_id::CategoryId,
};

/// The categories every user starts with.
const DEFAULT_CATEGORIES: &[(&str, CategoryType)] = &[
    ("Food", CategoryType::Expense),
    ("Transport", CategoryType::Expense),
    ("Health", CategoryType::Expense),
    ("Housing", CategoryType::Expense),
    ("Leisure", CategoryType::Expense),
    ("Education", CategoryType::Expense),
    ("Taxes", CategoryType::Expense),
    ("Investments", CategoryType::Expense),
    (UNSPECIFIED_CATEGORY_NAME, CategoryType::Expense),
    ("Salary", CategoryType::Income),
    ("Freelance", CategoryType::Income),
    ("Investments", CategoryType::Income),
    ("Other", CategoryType::Income),
    (UNSPECIFIED_CATEGORY_NAME, CategoryType::Income),
];

const CATEGORY_COLUMNS: &str = "id, name, type, user_id, is_default, created_at";

/// Create a category owned by `user_id` and return it with its generated ID.
pub fn create_category(
    name: &CategoryName,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO category (name, type, user_id, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (name.as_ref(), category_type, user_id.as_i64(), now),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a category that is visible to `user_id`, i.e. a default category
/// or one the user owns.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE id = ?1 AND (user_id = ?2 OR user_id IS NULL)"
        ))?
        .query_row((category_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve the default categories and the user's own categories, defaults
/// first and then ordered by name.
pub fn get_visible_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE user_id = ?1 OR user_id IS NULL
             ORDER BY is_default DESC, name ASC, type ASC"
        ))?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Check that `category_id` is visible to `user_id` and has the expected type.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the category is missing, owned by
/// another user or has a different type.
pub fn validate_category(
    category_id: CategoryId,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    match get_category(category_id, user_id, connection) {
        Ok(category) if category.category_type == category_type => Ok(category),
        Ok(_) | Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}

/// Get the ID of the default "Unspecified" category for `category_type`,
/// creating it if it is missing.
pub fn find_or_create_unspecified(
    category_type: CategoryType,
    connection: &Connection,
) -> Result<CategoryId, Error> {
    let existing = connection
        .query_row(
            "SELECT id FROM category WHERE is_default = 1 AND name = ?1 AND type = ?2",
            (UNSPECIFIED_CATEGORY_NAME, category_type),
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tracing::info!("creating missing {category_type} \"{UNSPECIFIED_CATEGORY_NAME}\" category");
    connection
        .query_row(
            "INSERT INTO category (name, type, user_id, is_default, created_at, updated_at)
             VALUES (?1, ?2, NULL, 1, ?3, ?3)
             RETURNING id",
            (
                UNSPECIFIED_CATEGORY_NAME,
                category_type,
                OffsetDateTime::now_utc(),
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Pick the category for a generated transaction.
///
/// Uses `preferred` if it is still visible to the user and has the right
/// type, otherwise falls back to the "Unspecified" category.
pub fn resolve_category(
    preferred: Option<CategoryId>,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<CategoryId, Error> {
    if let Some(category_id) = preferred {
        match validate_category(category_id, category_type, user_id, connection) {
            Ok(category) => return Ok(category.id),
            Err(Error::InvalidCategory(_)) => {}
            Err(error) => return Err(error),
        }
    }

    find_or_create_unspecified(category_type, connection)
}

/// Update a category owned by `user_id`.
///
/// # Errors
/// - [Error::DefaultCategoryReadOnly] if the category is a default category,
/// - [Error::CategoryInUse] if the type changes while records still use the category,
/// - [Error::NotFound] if the category does not exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    form: EditCategoryForm,
    connection: &Connection,
) -> Result<Category, Error> {
    let current = get_category(category_id, user_id, connection)?;

    if current.is_default {
        return Err(Error::DefaultCategoryReadOnly);
    }

    let name = match form.name {
        Some(name) => CategoryName::new(&name)?,
        None => current.name,
    };
    let category_type = form.category_type.unwrap_or(current.category_type);

    if category_type != current.category_type && is_referenced(category_id, connection)? {
        return Err(Error::CategoryInUse);
    }

    connection
        .prepare(&format!(
            "UPDATE category SET name = ?1, type = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                name.as_ref(),
                category_type,
                OffsetDateTime::now_utc(),
                category_id,
                user_id.as_i64(),
            ),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete a category owned by `user_id`.
///
/// # Errors
/// - [Error::DefaultCategoryReadOnly] if the category is a default category,
/// - [Error::CategoryInUse] if transactions still use the category,
/// - [Error::NotFound] if the category does not exist or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, user_id, connection)?;

    if category.is_default {
        return Err(Error::DefaultCategoryReadOnly);
    }

    if has_transactions(category_id, connection)? {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Whether any transaction is filed under the category.
fn has_transactions(category_id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE category_id = ?1)",
            [category_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Whether any record of a specific type points at the category.
fn is_referenced(category_id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE category_id = ?1)
                 OR EXISTS(SELECT 1 FROM recurring_item WHERE category_id = ?1)
                 OR EXISTS(SELECT 1 FROM debt WHERE category_id = ?1)
                 OR EXISTS(SELECT 1 FROM receivable WHERE category_id = ?1)",
            [category_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            user_id INTEGER,
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the default categories that are not in the database yet.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let now = OffsetDateTime::now_utc();
    let mut statement = connection.prepare(
        "INSERT INTO category (name, type, user_id, is_default, created_at, updated_at)
         SELECT ?1, ?2, NULL, 1, ?3, ?3
         WHERE NOT EXISTS (
            SELECT 1 FROM category WHERE is_default = 1 AND name = ?1 AND type = ?2
         )",
    )?;

    for (name, category_type) in DEFAULT_CATEGORIES {
        statement.execute((name, category_type, now))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_user_id: Option<i64> = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(2)?,
        user_id: raw_user_id.map(UserID::new),
        is_default: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{
            CategoryName, CategoryType, EditCategoryForm, create_category, delete_category,
            find_or_create_unspecified, get_category,
            get_visible_categories, resolve_category, update_category, validate_category,
        },
        test_utils::{must_create_test_user, must_create_user, must_open_test_db},
        transaction::{Transaction, create_transaction},
    };

    #[test]
    fn defaults_are_listed_before_user_categories() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        create_category(
            &CategoryName::new_unchecked("Aardvark food"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();

        let categories = get_visible_categories(user.id, &conn).unwrap();

        let last = categories.last().unwrap();
        assert_eq!(last.name.as_ref(), "Aardvark food");
        assert!(!last.is_default);
        assert!(categories[..categories.len() - 1].iter().all(|c| c.is_default));
    }

    #[test]
    fn other_users_categories_are_hidden() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let other_user = must_create_user("other@example.com", &conn);
        let category = create_category(
            &CategoryName::new_unchecked("Secret"),
            CategoryType::Expense,
            other_user.id,
            &conn,
        )
        .unwrap();

        assert_eq!(get_category(category.id, user.id, &conn), Err(Error::NotFound));
        assert!(
            get_visible_categories(user.id, &conn)
                .unwrap()
                .iter()
                .all(|c| c.id != category.id)
        );
    }

    #[test]
    fn deleting_default_category_is_rejected() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let unspecified = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();

        assert_eq!(
            delete_category(unspecified, user.id, &conn),
            Err(Error::DefaultCategoryReadOnly)
        );
    }

    #[test]
    fn editing_default_category_is_rejected() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let unspecified = find_or_create_unspecified(CategoryType::Income, &conn).unwrap();

        let result = update_category(
            unspecified,
            user.id,
            EditCategoryForm {
                name: Some("Mine now".to_owned()),
                category_type: None,
            },
            &conn,
        );

        assert_eq!(result, Err(Error::DefaultCategoryReadOnly));
    }

    #[test]
    fn deleting_unused_user_category_succeeds() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = create_category(
            &CategoryName::new_unchecked("Pets"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();

        delete_category(category.id, user.id, &conn).unwrap();

        assert_eq!(get_category(category.id, user.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn deleting_category_in_use_is_rejected() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = create_category(
            &CategoryName::new_unchecked("Pets"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(CategoryType::Expense, 12.5, date!(2025 - 03 - 01), category.id),
            user.id,
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_category(category.id, user.id, &conn),
            Err(Error::CategoryInUse)
        );
    }

    #[test]
    fn update_renames_category() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = create_category(
            &CategoryName::new_unchecked("Pets"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();

        let updated = update_category(
            category.id,
            user.id,
            EditCategoryForm {
                name: Some("Pet food".to_owned()),
                category_type: None,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.name.as_ref(), "Pet food");
        assert_eq!(updated.category_type, CategoryType::Expense);
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let expense = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();

        assert_eq!(
            validate_category(expense, CategoryType::Income, user.id, &conn),
            Err(Error::InvalidCategory(expense))
        );
    }

    #[test]
    fn resolve_falls_back_to_unspecified() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let unspecified = find_or_create_unspecified(CategoryType::Income, &conn).unwrap();

        assert_eq!(
            resolve_category(None, CategoryType::Income, user.id, &conn),
            Ok(unspecified)
        );
        assert_eq!(
            resolve_category(Some(9999), CategoryType::Income, user.id, &conn),
            Ok(unspecified)
        );
    }

    #[test]
    fn unspecified_is_seeded_once() {
        let conn = must_open_test_db();

        let first = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        let second = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn type_change_of_category_in_use_is_rejected() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = create_category(
            &CategoryName::new_unchecked("Pets"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(CategoryType::Expense, 12.5, date!(2025 - 03 - 01), category.id),
            user.id,
            &conn,
        )
        .unwrap();

        let result = update_category(
            category.id,
            user.id,
            EditCategoryForm {
                name: None,
                category_type: Some(CategoryType::Income),
            },
            &conn,
        );

        assert_eq!(result, Err(Error::CategoryInUse));
        assert_eq!(
            get_category(category.id, user.id, &conn).unwrap().category_type,
            CategoryType::Expense
        );
    }

    #[test]
    fn type_change_of_unused_category_succeeds() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = create_category(
            &CategoryName::new_unchecked("Gifts"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();

        let updated = update_category(
            category.id,
            user.id,
            EditCategoryForm {
                name: None,
                category_type: Some(CategoryType::Income),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.category_type, CategoryType::Income);
    }
}
