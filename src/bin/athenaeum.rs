//! Athenaeum command-line tool.
//!
//! Operates directly on the store with the same repository stack as the
//! server; no HTTP hop.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use athenaeum_server::{
    config::AppConfig,
    error::AppError,
    models::book::Book,
    repository::Repository,
    services::Services,
    store::PgStore,
};

/// Athenaeum - library management from the terminal.
#[derive(Parser)]
#[command(name = "athenaeum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Catalog commands.
    #[command(subcommand)]
    Books(BookCommands),

    /// Patron commands.
    #[command(subcommand)]
    Users(UserCommands),

    /// Circulation commands.
    #[command(subcommand)]
    Borrows(BorrowCommands),

    /// Reservation commands.
    #[command(subcommand)]
    Reservations(ReservationCommands),

    /// Show borrowing statistics.
    Stats {
        /// How many popular books to list.
        #[arg(short, long, default_value_t = 5)]
        top: usize,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a book to the catalog (re-adding an ISBN overwrites it).
    Add {
        isbn: String,
        title: String,
        author: String,
        category: String,

        #[arg(long, default_value = "")]
        publisher: String,

        #[arg(long, default_value_t = 0)]
        year: i32,

        #[arg(long, default_value_t = 1)]
        copies: i32,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Look up one book by ISBN.
    Search { isbn: String },

    /// List books in a category.
    ListByCategory { category: String },

    /// List books by an author.
    ListByAuthor { author: String },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new patron.
    Register {
        email: String,
        first_name: String,
        last_name: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        address: String,
    },

    /// Show one patron.
    Show { user_id: Uuid },
}

#[derive(Subcommand)]
enum BorrowCommands {
    /// Borrow a book for a patron.
    Borrow { user_id: Uuid, isbn: String },

    /// Return a borrowed book.
    Return { user_id: Uuid, isbn: String },

    /// Loan history of a patron.
    ListUser { user_id: Uuid },

    /// Loan history of a book.
    ListBook { isbn: String },
}

#[derive(Subcommand)]
enum ReservationCommands {
    /// Queue a reservation for a book.
    Add { user_id: Uuid, isbn: String },

    /// List reservations for a book, oldest first.
    List { isbn: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let services = Services::new(Repository::new(store));

    match cli.command {
        Commands::Books(cmd) => run_books(&services, cmd).await,
        Commands::Users(cmd) => run_users(&services, cmd).await,
        Commands::Borrows(cmd) => run_borrows(&services, cmd).await,
        Commands::Reservations(cmd) => run_reservations(&services, cmd).await,
        Commands::Stats { top } => run_stats(&services, top).await,
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Print denials and missing entities as messages instead of error chains;
/// anything else (store faults) still surfaces as a hard error.
fn report(result: Result<(), AppError>, success: &str) -> Result<()> {
    match result {
        Ok(()) => {
            println!("{success}");
            Ok(())
        }
        Err(AppError::Denied(reason)) => {
            println!("Denied: {reason}");
            Ok(())
        }
        Err(AppError::NotFound(message)) => {
            println!("Not found: {message}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_books(services: &Services, cmd: BookCommands) -> Result<()> {
    match cmd {
        BookCommands::Add {
            isbn,
            title,
            author,
            category,
            publisher,
            year,
            copies,
            description,
        } => {
            let book = Book {
                isbn: isbn.clone(),
                title,
                author,
                category,
                publisher,
                publication_year: year,
                total_copies: copies,
                available_copies: copies,
                description,
            };
            services.catalog.add_book(&book).await?;
            println!("Added book {isbn}");
        }
        BookCommands::Search { isbn } => match services.catalog.get_book(&isbn).await? {
            Some(book) => {
                let mut table = new_table(&["Field", "Value"]);
                table
                    .add_row(vec!["ISBN", &book.isbn])
                    .add_row(vec!["Title", &book.title])
                    .add_row(vec!["Author", &book.author])
                    .add_row(vec!["Category", &book.category])
                    .add_row(vec!["Publisher", &book.publisher])
                    .add_row(vec!["Year", &book.publication_year.to_string()])
                    .add_row(vec![
                        "Copies",
                        &format!("{}/{}", book.available_copies, book.total_copies),
                    ]);
                println!("{table}");
            }
            None => println!("Not found: book {isbn}"),
        },
        BookCommands::ListByCategory { category } => {
            let books = services.catalog.list_by_category(&category).await?;
            print_summaries(&books);
        }
        BookCommands::ListByAuthor { author } => {
            let books = services.catalog.list_by_author(&author).await?;
            print_summaries(&books);
        }
    }
    Ok(())
}

fn print_summaries(books: &[athenaeum_server::models::book::BookSummary]) {
    let mut table = new_table(&["ISBN", "Title", "Author/Category", "Available"]);
    for book in books {
        let extra = book
            .author
            .as_deref()
            .or(book.category.as_deref())
            .unwrap_or("");
        table.add_row(vec![
            book.isbn.clone(),
            book.title.clone(),
            extra.to_string(),
            format!("{}/{}", book.available_copies, book.total_copies),
        ]);
    }
    println!("{table}");
}

async fn run_users(services: &Services, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Register {
            email,
            first_name,
            last_name,
            phone,
            address,
        } => {
            let user = services
                .users
                .register(&email, &first_name, &last_name, &phone, &address)
                .await?;
            println!("Registered patron {}", user.user_id);
        }
        UserCommands::Show { user_id } => match services.users.get_user(user_id).await? {
            Some(user) => {
                let mut table = new_table(&["Field", "Value"]);
                table
                    .add_row(vec!["Id", &user.user_id.to_string()])
                    .add_row(vec!["Name", &user.full_name()])
                    .add_row(vec!["Email", &user.email])
                    .add_row(vec!["Registered", &user.registration_date.to_rfc3339()])
                    .add_row(vec!["Total borrows", &user.total_borrows.to_string()])
                    .add_row(vec!["Active borrows", &user.active_borrows.to_string()]);
                println!("{table}");
            }
            None => println!("Not found: user {user_id}"),
        },
    }
    Ok(())
}

async fn run_borrows(services: &Services, cmd: BorrowCommands) -> Result<()> {
    match cmd {
        BorrowCommands::Borrow { user_id, isbn } => report(
            services.loans.borrow(user_id, &isbn).await,
            &format!("Borrowed {isbn}"),
        ),
        BorrowCommands::Return { user_id, isbn } => report(
            services.loans.return_book(user_id, &isbn).await,
            &format!("Returned {isbn}"),
        ),
        BorrowCommands::ListUser { user_id } => {
            let loans = services.loans.user_borrows(user_id).await?;
            print_loans(&loans);
            Ok(())
        }
        BorrowCommands::ListBook { isbn } => {
            let loans = services.loans.book_borrows(&isbn).await?;
            print_loans(&loans);
            Ok(())
        }
    }
}

fn print_loans(loans: &[athenaeum_server::models::loan::LoanRecord]) {
    let mut table = new_table(&["ISBN", "Title", "Patron", "Borrowed", "Status", "Returned"]);
    for loan in loans {
        table.add_row(vec![
            loan.isbn.clone(),
            loan.book_title.clone(),
            loan.user_name.clone(),
            loan.borrow_date.to_rfc3339(),
            loan.status.as_str().to_string(),
            loan.return_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");
}

async fn run_reservations(services: &Services, cmd: ReservationCommands) -> Result<()> {
    match cmd {
        ReservationCommands::Add { user_id, isbn } => report(
            services.reservations.reserve(user_id, &isbn).await,
            &format!("Reserved {isbn}"),
        ),
        ReservationCommands::List { isbn } => {
            let reservations = services.reservations.list_by_isbn(&isbn).await?;
            let mut table = new_table(&["Date", "Patron", "Status"]);
            for reservation in &reservations {
                table.add_row(vec![
                    reservation.reservation_date.to_rfc3339(),
                    reservation.user_name.clone(),
                    reservation.status.clone(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

async fn run_stats(services: &Services, top: usize) -> Result<()> {
    let total = services.stats.total_borrows().await?;
    let top_books = services.stats.top_books(top).await?;

    println!("Total borrows: {total}");
    let mut table = new_table(&["ISBN", "Borrow count"]);
    for entry in &top_books {
        table.add_row(vec![entry.isbn.clone(), entry.borrow_count.to_string()]);
    }
    println!("{table}");
    Ok(())
}
