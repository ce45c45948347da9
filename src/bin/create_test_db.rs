use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use easybudget::{
    BudgetFields, CategoryEmoji, CategoryName, Email, GoalFields, NewUser, PasswordHash,
    Transaction, TransactionType, ValidatedPassword, create_budget, create_category,
    create_goal, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the easybudget API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The test user logs in with `test@example.com` and the password `test`.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            email: Email::new("test@example.com")?,
            name: Some("Test User".to_owned()),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating categories...");

    let mut categories = Vec::new();
    for (name, emoji) in [("Salary", "💰"), ("Groceries", "🛒"), ("Rent", "🏠"), ("Fun", "🎉")] {
        categories.push(create_category(
            user.id,
            CategoryName::new(name)?,
            CategoryEmoji::new(emoji)?,
            &conn,
        )?);
    }
    let [salary, groceries, rent, fun] = [0, 1, 2, 3].map(|index| categories[index].id);

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;
    for week in 0..26 {
        let date = today - Duration::weeks(week);
        let weekly = [
            (TransactionType::Expense, 85.0 + week as f64, "Supermarket", groceries),
            (TransactionType::Expense, 20.0, "Cinema", fun),
        ];

        for (transaction_type, amount, title, category_id) in weekly {
            create_transaction(
                user.id,
                Transaction::build(transaction_type, amount, date, title)
                    .category_id(Some(category_id)),
                &conn,
            )?;
            count += 1;
        }

        if week % 4 == 0 {
            create_transaction(
                user.id,
                Transaction::build(TransactionType::Income, 4200.0, date, "Salary")
                    .category_id(Some(salary)),
                &conn,
            )?;
            create_transaction(
                user.id,
                Transaction::build(TransactionType::Expense, 1600.0, date, "Rent")
                    .category_id(Some(rent))
                    .note(Some("Monthly rent".to_owned())),
                &conn,
            )?;
            count += 2;
        }
    }
    println!("Created {count} transactions.");

    println!("Creating budgets and goals...");

    create_budget(
        user.id,
        BudgetFields::new("Groceries", Some("🛒"), 400.0, None, Some(groceries))?,
        &conn,
    )?;
    create_budget(
        user.id,
        BudgetFields::new("Fun", None, 100.0, Some("#f97316"), None)?,
        &conn,
    )?;
    create_goal(
        user.id,
        GoalFields::new(
            "Holiday",
            Some("Two weeks somewhere warm"),
            3000.0,
            750.0,
            today + Duration::days(180),
            None,
        )?,
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
