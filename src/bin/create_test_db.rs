use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month, PrimitiveDateTime, Time};

use sales_dashboard::{Transaction, create_transaction, initialize_db};

/// A utility for creating a test database for the sales dashboard server.
///
/// The server only seeds an empty database, so pointing it at this file lets it
/// start without fetching the feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const CATEGORIES: [&str; 4] = ["electronics", "jewelery", "men's clothing", "women's clothing"];

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

    println!("Creating test transactions...");

    let mut count = 0;

    for month in 1..=12u8 {
        let month = Month::try_from(month)?;

        for i in 0..8u8 {
            let date = Date::from_calendar_date(2022, month, i + 1)?;
            let date_of_sale = PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0)?).assume_utc();
            let price = f64::from(i) * 137.5 + f64::from(u8::from(month));
            let category = CATEGORIES[usize::from(i) % CATEGORIES.len()];

            create_transaction(
                Transaction::build(&format!("{category} item {i} ({month})"), price)
                    .description(&format!("A sample {category} product sold in {month}."))
                    .category(category)
                    .date_of_sale(Some(date_of_sale)),
                &conn,
            )?;
            count += 1;
        }
    }

    for i in 0..5u8 {
        create_transaction(
            Transaction::build(&format!("unsold item {i}"), 25.0 * f64::from(i))
                .description("A sample product that has not sold yet.")
                .category(CATEGORIES[usize::from(i) % CATEGORIES.len()]),
            &conn,
        )?;
        count += 1;
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
