//! Shelfmark CLI
//!
//! Command-line interface for querying an in-memory book catalog:
//! - Look books up by ISBN, title prefix or author prefix
//! - Look users up by name prefix
//! - Report book and loan counts over a range of years
//! - Try out updates and loans against a throwaway catalog
//!
//! Every run starts from the sample books (or a CSV seed) and nothing is
//! written back.

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use shelfmark::catalog::{
    load_books, sample_books, sample_users, Book, BookPatch, Catalog, Loan, User,
};
use shelfmark::config::{generate_default_config, Config, LoggingConfig};
use shelfmark::RangeTotals;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory book catalog with indexed search and year statistics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV file to seed the catalog from instead of the sample books
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all books
    List {
        /// Only books that are not on loan
        #[arg(long)]
        available: bool,
    },

    /// Find a book by exact ISBN
    Find {
        isbn: String,
    },

    /// Search books by title prefix (case-insensitive)
    Title {
        prefix: String,
    },

    /// Search books by author prefix (case-insensitive)
    Author {
        prefix: String,
    },

    /// List books published in a year range
    Years {
        from: i32,
        to: i32,
    },

    /// Book and loan counts over a year range
    Stats {
        /// First year (default: start of tracked range)
        from: Option<i32>,
        /// Last year (default: end of tracked range)
        to: Option<i32>,
    },

    /// Earliest-published books
    Oldest {
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// Most recently published books
    Newest {
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// Apply field=value changes to a book and show the result
    Update {
        isbn: String,
        /// Changes in field=value format (isbn, title, author, year, genre, available)
        fields: Vec<String>,
    },

    /// List users, optionally by name prefix (case-insensitive)
    Users {
        prefix: Option<String>,
    },

    /// Lend a book to a user and show the loan
    Lend {
        isbn: String,
        user: String,
        /// Loan date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also return the book on this date and report days overdue
        #[arg(long)]
        returned: Option<NaiveDate>,
    },

    /// Walk through add, update, lend and remove on the sample catalog
    Demo,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config.logging);
    tracing::debug!("Shelfmark v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let books = match &cli.seed {
        Some(path) => load_books(path)
            .with_context(|| format!("loading seed file {}", path.display()))?,
        None if config.catalog.load_samples => sample_books(),
        None => Vec::new(),
    };
    let mut catalog = Catalog::from_books(&config.catalog, books)?;
    if config.catalog.load_samples {
        for user in sample_users() {
            catalog.add_user(user)?;
        }
    }
    let json = cli.format == "json";

    match cli.command {
        Commands::List { available } => {
            let books = if available {
                catalog.available_books()
            } else {
                catalog.list_books()
            };
            print_books(&books, json)?;
        }

        Commands::Find { isbn } => match catalog.get(&isbn) {
            Some(book) => print_books(&[book], json)?,
            None => {
                eprintln!("No book with ISBN {}", isbn);
                std::process::exit(1);
            }
        },

        Commands::Title { prefix } => print_books(&catalog.search_title(&prefix), json)?,

        Commands::Author { prefix } => print_books(&catalog.search_author(&prefix), json)?,

        Commands::Years { from, to } => print_books(&catalog.books_in_years(from, to), json)?,

        Commands::Stats { from, to } => {
            let domain = catalog.year_domain();
            let from = from.unwrap_or(*domain.start());
            let to = to.unwrap_or(*domain.end());
            print_totals(from, to, catalog.year_stats(from, to), json)?;
        }

        Commands::Oldest { limit } => print_books(&catalog.oldest(limit), json)?,

        Commands::Newest { limit } => print_books(&catalog.newest(limit), json)?,

        Commands::Update { isbn, fields } => {
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .filter_map(|field| {
                    let pair = field.split_once('=');
                    if pair.is_none() {
                        eprintln!("Skipping malformed change (expected field=value): {}", field);
                    }
                    pair
                })
                .collect();
            let patch = BookPatch::from_fields(pairs)?;
            if patch.is_empty() {
                anyhow::bail!("no known fields to change (isbn, title, author, year, genre, available)");
            }
            let book = catalog.update_book(&isbn, &patch)?;
            print_books(&[book], json)?;
        }

        Commands::Users { prefix } => {
            let users = match prefix {
                Some(prefix) => catalog.search_users(&prefix),
                None => catalog.list_users(),
            };
            print_users(&users, json)?;
        }

        Commands::Lend {
            isbn,
            user,
            date,
            returned,
        } => {
            let lent_on = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            warn_if_untracked(&catalog, lent_on);
            let id = catalog.lend(&isbn, &user, lent_on)?;
            if let Some(returned_on) = returned {
                catalog.return_loan(id, returned_on)?;
            }
            if let Some(loan) = catalog.get_loan(id) {
                print_loan(loan, json)?;
            }
        }

        Commands::Demo => run_demo(&mut catalog)?,

        Commands::Config { .. } => unreachable!("handled before the catalog is built"),
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("shelfmark={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_books(books: &[&Book], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(books)?);
        return Ok(());
    }

    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    println!(
        "{:<16} {:<28} {:<22} {:>6}  {:<16} {}",
        "ISBN", "Title", "Author", "Year", "Genre", "Status"
    );
    println!("{}", "-".repeat(100));
    for book in books {
        println!(
            "{:<16} {:<28} {:<22} {:>6}  {:<16} {}",
            book.isbn,
            truncate(&book.title, 28),
            truncate(&book.author, 22),
            book.year,
            truncate(&book.genre, 16),
            if book.available { "available" } else { "on loan" }
        );
    }
    Ok(())
}

fn print_totals(from: i32, to: i32, totals: RangeTotals, json: bool) -> anyhow::Result<()> {
    if json {
        let body = serde_json::json!({
            "from": from,
            "to": to,
            "books": totals.records,
            "loans": totals.events,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Years {}-{}: {} books, {} loans", from, to, totals.records, totals.events);
    }
    Ok(())
}

fn print_users(users: &[&User], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!("{:<8} {:<28} {}", "ID", "Name", "Contact");
    println!("{}", "-".repeat(60));
    for user in users {
        println!("{:<8} {:<28} {}", user.id, truncate(&user.name, 28), user.contact);
    }
    Ok(())
}

fn print_loan(loan: &Loan, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(loan)?);
    } else {
        println!("{}", loan);
        if !loan.is_active() {
            println!("Days overdue: {}", loan.days_overdue());
        }
    }
    Ok(())
}

fn warn_if_untracked(catalog: &Catalog, date: NaiveDate) {
    let domain = catalog.year_domain();
    if !domain.contains(&date.year()) {
        eprintln!(
            "note: {} is outside the tracked years {}-{}; the loan is recorded but not counted",
            date.year(),
            domain.start(),
            domain.end()
        );
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

fn run_demo(catalog: &mut Catalog) -> anyhow::Result<()> {
    // Dated inside the default tracked years so the loan shows in the totals
    let lent_on = NaiveDate::from_ymd_opt(2023, 10, 15).context("demo loan date")?;
    let returned_on = NaiveDate::from_ymd_opt(2023, 11, 3).context("demo return date")?;

    println!("== Catalog: {}", catalog.stats());

    println!("\n== Title search \"the\"");
    print_books(&catalog.search_title("the"), false)?;

    println!("\n== Adding Dune (1965)");
    catalog.add_book(Book::new(
        "978-0441013593",
        "Dune",
        "Frank Herbert",
        1965,
        "Science Fiction",
    ))?;
    print_totals(1900, 1999, catalog.year_stats(1900, 1999), false)?;

    println!("\n== Renaming 1984");
    catalog.update_book(
        "978-0142437230",
        &BookPatch::new().title("Nineteen Eighty-Four"),
    )?;
    print_books(&catalog.search_title("nineteen"), false)?;

    println!("\n== Lending The Hobbit to U001 on {}", lent_on);
    warn_if_untracked(catalog, lent_on);
    let loan = catalog.lend("978-0544003415", "U001", lent_on)?;
    println!("loan {} issued", loan);
    match catalog.remove_book("978-0544003415") {
        Ok(_) => println!("unexpected: removed a lent book"),
        Err(e) => println!("remove refused: {}", e),
    }
    match catalog.remove_user("U001") {
        Ok(_) => println!("unexpected: removed a user with a loan"),
        Err(e) => println!("remove refused: {}", e),
    }

    println!("\n== Returning {} on {}", loan, returned_on);
    let returned = catalog.return_loan(loan, returned_on)?;
    print_loan(returned, false)?;

    println!("\n== Removing The Great Gatsby");
    catalog.remove_book("978-0451524935")?;
    print_books(&catalog.search_title("the"), false)?;

    let domain = catalog.year_domain();
    println!();
    print_totals(
        *domain.start(),
        *domain.end(),
        catalog.year_stats(*domain.start(), *domain.end()),
        false,
    )?;
    println!("== Catalog: {}", catalog.stats());

    Ok(())
}
