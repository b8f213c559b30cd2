//! Equity curve export.

use std::io::Write;
use std::path::Path;

use replay_core::{Error, Result};
use tracing::info;

use crate::performance::EquityCurve;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write `curve` as CSV to any writer.
///
/// Columns: `timestamp,cash,commission,total,<symbols…>,returns,equity_curve,drawdown`.
pub fn write_equity<W: Write>(writer: W, curve: &EquityCurve, symbols: &[String]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec!["timestamp", "cash", "commission", "total"];
    header.extend(symbols.iter().map(String::as_str));
    header.extend(["returns", "equity_curve", "drawdown"]);
    out.write_record(&header)?;

    for row in curve.rows() {
        if row.values.len() != symbols.len() {
            return Err(Error::config(format!(
                "equity row has {} instrument values, header has {}",
                row.values.len(),
                symbols.len()
            )));
        }
        let mut record = Vec::with_capacity(header.len());
        record.push(row.ts.format(TIMESTAMP_FORMAT).to_string());
        record.push(row.cash.to_string());
        record.push(row.commission.to_string());
        record.push(row.total.to_string());
        record.extend(row.values.iter().map(f64::to_string));
        record.push(row.returns.to_string());
        record.push(row.equity.to_string());
        record.push(row.drawdown.to_string());
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Write `curve` to a CSV file at `path`, replacing it if present.
pub fn write_equity_csv(path: impl AsRef<Path>, curve: &EquityCurve, symbols: &[String]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_equity(file, curve, symbols)?;
    info!(path = %path.display(), rows = curve.len(), "equity curve written");
    Ok(())
}
