//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::{UserID, ensure_owner},
    category::{Category, CategoryEmoji, CategoryId, CategoryName, category_name_key},
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name, ignoring case.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    emoji: CategoryEmoji,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (user_id, name, name_key, emoji) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, emoji",
        )?
        .query_row(
            (user_id.as_i64(), name.as_ref(), name.key(), emoji.as_ref()),
            map_row,
        )
        .map_err(|error| map_duplicate_name(error, &name))
}

/// Retrieve a single category by ID regardless of who owns it.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, user_id, name, emoji FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve a category that must belong to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist, or
/// [Error::Forbidden] if it belongs to another user.
pub fn get_owned_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = get_category(category_id, connection)?;
    ensure_owner(category.user_id, user_id)?;

    Ok(category)
}

/// Retrieve all of a user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, emoji FROM category
             WHERE user_id = :user_id
             ORDER BY name_key ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Find the user's category called `name`, ignoring case.
pub fn find_category_by_name(
    user_id: UserID,
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    match connection
        .prepare(
            "SELECT id, user_id, name, emoji FROM category
             WHERE user_id = ?1 AND name_key = ?2",
        )?
        .query_row((user_id.as_i64(), category_name_key(name)), map_row)
    {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Update a category's name and emoji.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category doesn't exist or
/// [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    emoji: CategoryEmoji,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "UPDATE category SET name = ?1, name_key = ?2, emoji = ?3 WHERE id = ?4
             RETURNING id, user_id, name, emoji",
        )?
        .query_row(
            (name.as_ref(), name.key(), emoji.as_ref(), category_id),
            map_row,
        )
        .map_err(|error| map_duplicate_name(error, &name))
}

/// Delete a category by ID. Transactions and budgets in the category become uncategorized.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category doesn't exist.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            emoji TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_user_name
            ON category(user_id, name_key);",
    )?;

    Ok(())
}

fn map_duplicate_name(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067 => {
            Error::DuplicateCategoryName(name.to_string())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_emoji: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        emoji: CategoryEmoji::new_unchecked(&raw_emoji),
    })
}

#[cfg(test)]
mod category_query_tests {
    use crate::{
        Error,
        category::{
            CategoryEmoji, CategoryName, create_category, delete_category,
            find_category_by_name, get_categories, get_category, get_owned_category,
            update_category,
        },
        test_utils::{create_test_user, get_test_connection},
    };

    fn name(raw: &str) -> CategoryName {
        CategoryName::new_unchecked(raw)
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);

        let category =
            create_category(user_id, name("Food"), CategoryEmoji::default(), &connection)
                .unwrap();

        assert!(category.id > 0);
        assert_eq!(category.user_id, user_id);
        assert_eq!(category.name, name("Food"));
        assert_eq!(category.emoji, CategoryEmoji::default());
    }

    #[test]
    fn create_category_rejects_case_insensitive_duplicate() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        create_category(user_id, name("Food"), CategoryEmoji::default(), &connection).unwrap();

        let result =
            create_category(user_id, name("FOOD"), CategoryEmoji::default(), &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("FOOD".to_owned())));
    }

    #[test]
    fn create_category_folds_non_ascii_case() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        let category =
            create_category(user_id, name("Caffè"), CategoryEmoji::default(), &connection)
                .unwrap();

        let result =
            create_category(user_id, name("CAFFÈ"), CategoryEmoji::default(), &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("CAFFÈ".to_owned()))
        );
        assert_eq!(
            find_category_by_name(user_id, "caffÈ", &connection),
            Ok(Some(category))
        );
    }

    #[test]
    fn different_users_may_share_a_name() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let bob = create_test_user("b@example.com", &connection);
        create_category(alice, name("Food"), CategoryEmoji::default(), &connection).unwrap();

        let result = create_category(bob, name("Food"), CategoryEmoji::default(), &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_category(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_owned_category_forbids_other_users() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let bob = create_test_user("b@example.com", &connection);
        let category =
            create_category(alice, name("Food"), CategoryEmoji::default(), &connection).unwrap();

        assert_eq!(
            get_owned_category(category.id, bob, &connection),
            Err(Error::Forbidden)
        );
        assert_eq!(
            get_owned_category(category.id, alice, &connection),
            Ok(category)
        );
    }

    #[test]
    fn get_categories_is_scoped_and_ordered() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let bob = create_test_user("b@example.com", &connection);
        create_category(alice, name("rent"), CategoryEmoji::default(), &connection).unwrap();
        create_category(alice, name("Food"), CategoryEmoji::default(), &connection).unwrap();
        create_category(bob, name("Fun"), CategoryEmoji::default(), &connection).unwrap();

        let names: Vec<String> = get_categories(alice, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, ["Food", "rent"]);
    }

    #[test]
    fn find_category_by_name_ignores_case() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        let category =
            create_category(user_id, name("Food"), CategoryEmoji::default(), &connection)
                .unwrap();

        assert_eq!(
            find_category_by_name(user_id, " food ", &connection),
            Ok(Some(category))
        );
        assert_eq!(find_category_by_name(user_id, "Rent", &connection), Ok(None));
    }

    #[test]
    fn update_category_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        let category =
            create_category(user_id, name("Food"), CategoryEmoji::default(), &connection)
                .unwrap();
        let emoji = CategoryEmoji::new("🍔").unwrap();

        let updated =
            update_category(category.id, name("Groceries"), emoji.clone(), &connection).unwrap();

        assert_eq!(updated.name, name("Groceries"));
        assert_eq!(updated.emoji, emoji);
        assert_eq!(get_category(category.id, &connection), Ok(updated));
    }

    #[test]
    fn update_missing_category_returns_not_found() {
        let connection = get_test_connection();

        let result = update_category(999, name("Food"), CategoryEmoji::default(), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        let category =
            create_category(user_id, name("Food"), CategoryEmoji::default(), &connection)
                .unwrap();

        delete_category(category.id, &connection).unwrap();

        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
        assert_eq!(delete_category(category.id, &connection), Err(Error::NotFound));
    }
}
