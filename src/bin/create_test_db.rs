use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use xfin_rs::{DEMO_EMAIL, DEMO_PASSWORD, PasswordHash, initialize_db, local_today, seed_demo_data};

/// A utility for creating a test database for the REST API server of xfin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The canonical name of the timezone used to date the sample records.
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

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

    let today = local_today(&args.timezone)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user and sample data...");
    seed_demo_data(today, PasswordHash::DEFAULT_COST, &conn)?;

    println!("Success! Log in with {DEMO_EMAIL} and the password '{DEMO_PASSWORD}'.");

    Ok(())
}
