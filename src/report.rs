//! CSV export of the ledger.

use crate::debtor::PaymentState;
use crate::error::Result;
use crate::ledger::Ledger;
use std::io::Write;

/// Writes one row per record, in ledger order.
///
/// Columns: `id,name,amount_due,status,settled_at,approved_by,receipt`.
pub fn write_csv<W: Write>(ledger: &Ledger, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "name",
        "amount_due",
        "status",
        "settled_at",
        "approved_by",
        "receipt",
    ])?;

    for debtor in ledger.debtors() {
        let (settled_at, approved_by) = match debtor.state() {
            PaymentState::Settled {
                settled_at,
                approved_by,
                ..
            } => (settled_at.as_str(), approved_by.as_str()),
            _ => ("", ""),
        };
        csv_writer.write_record([
            debtor.id().0.to_string().as_str(),
            debtor.name(),
            debtor.amount_due().to_string().as_str(),
            debtor.state().label(),
            settled_at,
            approved_by,
            debtor.receipt_path().unwrap_or(""),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
