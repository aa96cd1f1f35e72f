//! Storefront CLI - cart inspection and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! sf-cli cart show
//!
//! # Add two of a product
//! sf-cli cart add p1 -q 2
//!
//! # Change or drop a line
//! sf-cli cart update p1 5
//! sf-cli cart remove p1
//!
//! # Empty the cart and delete its durable copy
//! sf-cli cart clear
//!
//! # Browse the catalog
//! sf-cli products list --search lamp --sort price-low
//! ```
//!
//! Both command groups read the same environment as the server
//! (`STOREFRONT_STORAGE_DIR`, `STOREFRONT_CART_KEY`, `STOREFRONT_CATALOG_PATH`).
//! Run the CLI while the server is stopped: each process hydrates once and
//! does not see the other's later writes.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use storefront::config::StorefrontConfig;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a catalog product to the cart
    Add {
        /// Catalog product id
        product_id: String,

        /// Quantity to add
        #[arg(short, long)]
        quantity: Option<i64>,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        product_id: String,
    },
    /// Set the quantity of a cart line (0 removes it)
    Update {
        /// Catalog product id
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List catalog products
    List {
        /// Text search over title, description and location
        #[arg(short, long)]
        search: Option<String>,

        /// Category to filter by
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (`newest`, `oldest`, `price-low`, `price-high`, `featured`)
        #[arg(long)]
        sort: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Products per page
        #[arg(long, default_value_t = storefront::services::catalog::DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    match cli.command {
        Commands::Cart { action } => {
            let mut store = commands::cart::open(&config)?;
            match action {
                CartAction::Show => commands::cart::show(&store),
                CartAction::Add {
                    product_id,
                    quantity,
                } => {
                    let catalog = commands::load_catalog(&config)?;
                    commands::cart::add(&mut store, &catalog, &product_id, quantity)?;
                }
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&mut store, &product_id);
                }
                CartAction::Update {
                    product_id,
                    quantity,
                } => commands::cart::update(&mut store, &product_id, quantity),
                CartAction::Clear => commands::cart::clear(&mut store),
            }
        }
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                sort,
                page,
                per_page,
            } => {
                let catalog = commands::load_catalog(&config)?;
                let query = commands::products::ListQuery {
                    search,
                    category,
                    sort,
                    page,
                    per_page,
                };
                commands::products::list(&catalog, &query)?;
            }
        },
    }
    Ok(())
}
