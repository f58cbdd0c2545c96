use clap::{Args, Parser, Subcommand};
use debt_ledger::Amount;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "debt-ledger",
    about = "Shared debt ledger with manager-approved payment claims",
    version
)]
pub struct Cli {
    /// Directory holding data.json and receipts/
    #[arg(long, global = true, env = "DEBT_LEDGER_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Manager secret, required for manager commands
    #[arg(long, global = true, env = "DEBT_LEDGER_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find records by (part of) a name
    Search { query: String },
    /// Show one record
    Show { id: u64 },
    /// Declare that you paid: cash, or card with a receipt file
    Pay(PayArgs),
    /// Open the receipt attached to a record
    Receipt { id: u64 },
    /// Manager-only commands
    #[command(subcommand)]
    Manager(ManagerCommand),
}

#[derive(Args)]
pub struct PayArgs {
    /// Record id as shown by `search`
    pub id: u64,
    /// Name as shown by `search`
    #[arg(long)]
    pub name: String,
    /// Amount as shown by `search`
    #[arg(long, value_parser = Amount::from_str)]
    pub amount: Amount,
    /// Card receipt image; without it the claim is a cash payment
    #[arg(long)]
    pub receipt: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ManagerCommand {
    /// List every record
    List,
    /// List records with a claim awaiting approval
    Pending,
    /// Add a person
    Add {
        name: String,
        #[arg(value_parser = Amount::from_str)]
        amount: Amount,
    },
    /// Change a record's name and/or amount
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = Amount::from_str)]
        amount: Option<Amount>,
    },
    /// Delete a record and its receipt
    Delete { id: u64 },
    /// Delete every record and receipt
    Reset {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },
    /// Approve a pending cash claim
    ApproveCash { id: u64 },
    /// Approve a pending card claim
    ApproveCard {
        id: u64,
        /// Open the receipt before approving
        #[arg(long)]
        open: bool,
    },
    /// Change the manager secret (at least 4 characters)
    SetSecret { new_secret: String },
    /// Write all records as CSV to stdout
    Export,
}
