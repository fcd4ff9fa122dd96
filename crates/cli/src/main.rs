//! Customer Registry CLI - inspect the store and exercise the lookups.
//!
//! # Usage
//!
//! ```bash
//! # List stored customers
//! registry-cli list
//!
//! # Show or delete one customer
//! registry-cli show <ID>
//! registry-cli delete <ID>
//!
//! # Call the remote lookups directly
//! registry-cli lookup pan ABCDE1234Z
//! registry-cli lookup postcode 411001
//! ```
//!
//! # Commands
//!
//! - `list` - One line per stored customer
//! - `show` - Full record including addresses
//! - `delete` - Remove a customer from the store
//! - `lookup` - Run a PAN or postcode lookup

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(author, version, about = "Customer registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored customers
    List,
    /// Show one customer
    Show {
        /// Customer ID
        id: String,
    },
    /// Delete one customer
    Delete {
        /// Customer ID
        id: String,
    },
    /// Run a remote lookup
    Lookup {
        #[command(subcommand)]
        target: LookupTarget,
    },
}

#[derive(Subcommand)]
enum LookupTarget {
    /// Verify a PAN and print the holder's name
    Pan {
        /// Ten-character PAN
        pan: String,
    },
    /// Print city and state for a postcode
    Postcode {
        /// Six-character postcode
        postcode: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::List => {
            let store = commands::customers::open_store()?;
            let customers = commands::customers::list(&store).await;
            if customers.is_empty() {
                tracing::info!("No customers found");
            }
            for customer in &customers {
                tracing::info!("{}", commands::customers::summary(customer));
            }
        }
        Commands::Show { id } => {
            let store = commands::customers::open_store()?;
            let customer = commands::customers::show(&store, &id).await?;
            tracing::info!("{}", commands::customers::summary(&customer));
            for (index, address) in customer.addresses.iter().enumerate() {
                tracing::info!(
                    "  Address {}: {}, {}, {} {}, {}",
                    index + 1,
                    address.address_line1,
                    address.address_line2,
                    address.city,
                    address.postcode,
                    address.state
                );
            }
        }
        Commands::Delete { id } => {
            let store = commands::customers::open_store()?;
            let removed = commands::customers::delete(&store, &id).await?;
            tracing::info!("Deleted {} ({})", removed.full_name, removed.id);
        }
        Commands::Lookup { target } => {
            let client = commands::lookup::client()?;
            match target {
                LookupTarget::Pan { pan } => {
                    let result = commands::lookup::pan(&client, &pan).await?;
                    if result.is_valid {
                        tracing::info!("{pan}: valid, held by {}", result.full_name);
                    } else {
                        tracing::info!("{pan}: not valid");
                    }
                }
                LookupTarget::Postcode { postcode } => {
                    let details = commands::lookup::postcode(&client, &postcode).await?;
                    tracing::info!(
                        "{postcode}: city '{}', state '{}'",
                        details.first_city(),
                        details.first_state()
                    );
                }
            }
        }
    }
    Ok(())
}
