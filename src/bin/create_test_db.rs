use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack_rs::{
    Amount, Category, NewBudget, NewTransaction, NewUser, PasswordHash, TransactionType, Username,
    ValidatedPassword, create_budget, create_transaction, create_user, initialize_db,
    seed_default_categories,
};

/// A utility for creating a demo database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (type, category name, amount in cents, days ago, description)
const SAMPLE_TRANSACTIONS: [(TransactionType, &str, i64, i64, &str); 20] = [
    (TransactionType::Income, "Salary", 500_000, 5, "Monthly salary"),
    (TransactionType::Expense, "Rent", 120_000, 3, "Monthly rent payment"),
    (TransactionType::Expense, "Groceries", 8_550, 2, "Weekly groceries"),
    (TransactionType::Expense, "Utilities", 12_000, 1, "Electricity and water"),
    (TransactionType::Expense, "Transportation", 5_000, 0, "Gas"),
    (TransactionType::Income, "Salary", 500_000, 35, "Monthly salary"),
    (TransactionType::Income, "Freelance", 80_000, 32, "Freelance project"),
    (TransactionType::Expense, "Rent", 120_000, 33, "Monthly rent"),
    (TransactionType::Expense, "Groceries", 25_000, 30, "Monthly groceries"),
    (TransactionType::Expense, "Utilities", 11_500, 28, "Utilities"),
    (TransactionType::Expense, "Entertainment", 6_000, 25, "Movie tickets"),
    (TransactionType::Expense, "Dining Out", 4_500, 22, "Restaurant"),
    (TransactionType::Expense, "Transportation", 8_000, 20, "Gas and parking"),
    (TransactionType::Income, "Salary", 500_000, 65, "Monthly salary"),
    (TransactionType::Expense, "Rent", 120_000, 63, "Monthly rent"),
    (TransactionType::Expense, "Groceries", 28_000, 60, "Monthly groceries"),
    (TransactionType::Expense, "Utilities", 12_500, 58, "Utilities"),
    (TransactionType::Expense, "Entertainment", 7_500, 55, "Concert tickets"),
    (TransactionType::Expense, "Dining Out", 12_000, 52, "Dinner with friends"),
    (TransactionType::Expense, "Transportation", 9_000, 50, "Gas"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new("demo123456")?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            username: Username::new("demo")?,
            password_hash,
            email: "demo@example.com".to_owned(),
        },
        &conn,
    )?;
    let categories = seed_default_categories(user.id, &conn)?;

    println!("Creating sample transactions...");
    let today = OffsetDateTime::now_utc().date();

    for (transaction_type, category_name, cents, days_ago, description) in SAMPLE_TRANSACTIONS {
        create_transaction(
            NewTransaction {
                user_id: user.id,
                transaction_type,
                amount: Amount::from_cents_unchecked(cents),
                category_id: find_category(&categories, category_name)?.id,
                date: today - Duration::days(days_ago),
                description: Some(description.to_owned()),
            },
            &conn,
        )?;
    }

    println!("Creating overall budget for this month...");
    create_budget(
        NewBudget {
            user_id: user.id,
            month: u8::from(today.month()),
            year: u16::try_from(today.year())?,
            amount: Amount::from_cents_unchecked(300_000),
            category_id: None,
        },
        &conn,
    )?;

    println!("Success! Log in with username 'demo' and password 'demo123456'.");

    Ok(())
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> Result<&'a Category, String> {
    categories
        .iter()
        .find(|category| category.name.as_ref() == name)
        .ok_or_else(|| format!("Default category \"{name}\" is missing"))
}
