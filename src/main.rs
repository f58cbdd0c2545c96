//! Debt Ledger CLI
//!
//! Debtors look themselves up and declare payments; the manager reviews and
//! approves them.
//!
//! # Usage
//!
//! ```bash
//! debt-ledger search ali
//! debt-ledger pay 1 --name Ali --amount 50000
//! debt-ledger --secret 1357 manager approve-cash 1
//! ```
//!
//! # Environment Variables
//!
//! - `DEBT_LEDGER_DIR`: data directory (default: current directory)
//! - `DEBT_LEDGER_SECRET`: manager secret
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity

mod cli;

use clap::Parser;
use cli::{Cli, Command, ManagerCommand, PayArgs};
use debt_ledger::{
    ApprovalOutcome, AuthGate, ClaimOutcome, Config, DebtorId, DebtorRecord, DebtorSnapshot,
    LedgerError, LedgerStore, ManagerGrant, PaymentLifecycle, PaymentState, ReceiptStore,
    ReceiptViewer, Result,
};
use std::io;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Opens files with the platform's default application.
struct SystemViewer;

impl ReceiptViewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = if cfg!(target_os = "macos") {
            process::Command::new("open")
        } else if cfg!(windows) {
            let mut c = process::Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            process::Command::new("xdg-open")
        };
        let status = cmd.arg(path).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("viewer exited with {}", status),
            ))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::in_dir(&cli.data_dir);
    let store = config.ledger_store();
    let receipts = config.receipt_store();
    let lifecycle = PaymentLifecycle::new(&store, &receipts, &config);

    match cli.command {
        Command::Search { query } => search(&store, &query),
        Command::Show { id } => show(&store, DebtorId(id)),
        Command::Pay(args) => pay(&lifecycle, args),
        Command::Receipt { id } => open_receipt(&store, &receipts, DebtorId(id)),
        Command::Manager(command) => {
            let secret = cli.secret.ok_or(LedgerError::MissingSecret)?;
            let grant = AuthGate::new(&store).login(&secret)?;
            manage(&store, &receipts, &lifecycle, &grant, command)
        }
    }
}

fn search(store: &LedgerStore, query: &str) -> Result<()> {
    let ledger = store.load()?;
    let results = debt_ledger::resolver::search(query, &ledger);
    if results.is_empty() {
        println!("No matching name found. If you are new, ask the manager to add you.");
        return Ok(());
    }
    for record in results {
        println!("{}", summary(record));
    }
    Ok(())
}

fn show(store: &LedgerStore, id: DebtorId) -> Result<()> {
    let ledger = store.load()?;
    let record = ledger
        .get(id)
        .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

    println!("{}", record.name());
    println!("Amount due: {}", record.amount_due());
    match record.state() {
        PaymentState::Unpaid => {
            println!("Status: unpaid");
            if !record.amount_due().is_zero() {
                println!(
                    "Reminder: you owe {} today, please pay.",
                    record.amount_due()
                );
            }
        }
        PaymentState::PendingCash => {
            println!("Status: cash payment registered, awaiting manager approval")
        }
        PaymentState::PendingCard { receipt } => {
            println!("Status: card receipt uploaded, awaiting manager approval");
            println!("Receipt: {}", receipt);
        }
        PaymentState::Settled {
            settled_at,
            approved_by,
            ..
        } => {
            println!("Status: settled");
            println!("Settled at {} (approved by {})", settled_at, approved_by);
        }
    }
    Ok(())
}

fn pay(lifecycle: &PaymentLifecycle<'_>, args: PayArgs) -> Result<()> {
    let snapshot = DebtorSnapshot {
        id: DebtorId(args.id),
        name: args.name.trim().to_string(),
        amount_due: args.amount,
    };

    let outcome = match &args.receipt {
        Some(path) => lifecycle.submit_card(&snapshot, path)?,
        None => lifecycle.submit_cash(&snapshot)?,
    };

    match outcome {
        ClaimOutcome::Submitted if args.receipt.is_some() => {
            println!("Receipt uploaded. Waiting for manager approval.")
        }
        ClaimOutcome::Submitted => {
            println!("Cash payment registered. Waiting for manager approval.")
        }
        ClaimOutcome::Duplicate(PaymentState::Settled { .. }) => {
            println!("Your debt is already settled.")
        }
        ClaimOutcome::Duplicate(_) => {
            println!("A payment claim is already registered and awaiting manager approval.")
        }
    }
    Ok(())
}

fn open_receipt(store: &LedgerStore, receipts: &ReceiptStore, id: DebtorId) -> Result<()> {
    let ledger = store.load()?;
    let record = ledger
        .get(id)
        .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
    match record.receipt_path() {
        Some(path) => view(receipts, path),
        None => println!("{} has no receipt attached.", record.name()),
    }
    Ok(())
}

/// Viewer failures are reported but never abort the command.
fn view(receipts: &ReceiptStore, path: &str) {
    if let Err(e) = receipts.open(path, &SystemViewer) {
        eprintln!("Warning: could not open receipt: {}", e);
    }
}

fn manage(
    store: &LedgerStore,
    receipts: &ReceiptStore,
    lifecycle: &PaymentLifecycle<'_>,
    grant: &ManagerGrant,
    command: ManagerCommand,
) -> Result<()> {
    match command {
        ManagerCommand::List => {
            let ledger = store.load()?;
            for record in ledger.debtors() {
                println!("{}", summary(record));
            }
        }
        ManagerCommand::Pending => {
            let ledger = store.load()?;
            for record in ledger.pending() {
                println!("{}", summary(record));
            }
        }
        ManagerCommand::Add { name, amount } => {
            let id = lifecycle.add(grant, &name, amount)?;
            println!("Added {} {}", id, name.trim());
        }
        ManagerCommand::Edit { id, name, amount } => {
            if name.is_none() && amount.is_none() {
                return Err(LedgerError::Validation(
                    "nothing to change; pass --name and/or --amount".to_string(),
                ));
            }
            lifecycle.edit(grant, DebtorId(id), name.as_deref(), amount)?;
            println!("Updated {}", DebtorId(id));
        }
        ManagerCommand::Delete { id } => {
            let removed = lifecycle.delete(grant, DebtorId(id))?;
            println!("Deleted {} {}", removed.id(), removed.name());
        }
        ManagerCommand::Reset { yes } => {
            if !yes {
                return Err(LedgerError::Validation(
                    "reset deletes every record and receipt; pass --yes to confirm".to_string(),
                ));
            }
            let count = lifecycle.reset_all(grant)?;
            println!("Removed {} records.", count);
        }
        ManagerCommand::ApproveCash { id } => {
            report_approval(lifecycle.approve_cash(grant, DebtorId(id))?, DebtorId(id));
        }
        ManagerCommand::ApproveCard { id, open } => {
            let id = DebtorId(id);
            if open {
                let ledger = store.load()?;
                if let Some(path) = ledger.get(id).and_then(DebtorRecord::receipt_path) {
                    view(receipts, path);
                }
            }
            report_approval(lifecycle.approve_card(grant, id)?, id);
        }
        ManagerCommand::SetSecret { new_secret } => {
            AuthGate::new(store).change_secret(grant, &new_secret)?;
            println!("Secret changed.");
        }
        ManagerCommand::Export => {
            let ledger = store.load()?;
            let stdout = io::stdout();
            debt_ledger::report::write_csv(&ledger, stdout.lock())?;
        }
    }
    Ok(())
}

fn report_approval(outcome: ApprovalOutcome, id: DebtorId) {
    match outcome {
        ApprovalOutcome::Approved => println!("Payment of {} approved.", id),
        ApprovalOutcome::NothingToApprove => println!("Nothing to approve for {}.", id),
    }
}

fn summary(record: &DebtorRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.id(),
        record.name(),
        record.amount_due(),
        record.state()
    )
}
