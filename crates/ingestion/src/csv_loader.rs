//! CSV bar loading.
//!
//! Files have a header row followed by
//! `datetime,open,high,low,close,volume,adj_close`. Columns are read by
//! position, so header spelling does not matter.

use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use replay_core::{Bar, Error, Result, Timestamp};
use tracing::{debug, info};

use crate::historic::HistoricBarSource;

const COLUMNS: [&str; 7] = ["datetime", "open", "high", "low", "close", "volume", "adj_close"];

/// Parse a bar timestamp: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::data(format!("unrecognised timestamp '{raw}'")))
}

/// Read bars from any CSV reader. `name` labels errors.
pub fn read_bars<R: io::Read>(reader: R, name: &str) -> Result<Vec<Bar>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = i + 2;
        if record.len() < COLUMNS.len() {
            return Err(Error::data(format!(
                "{name} line {line}: expected {} columns, found {}",
                COLUMNS.len(),
                record.len()
            )));
        }

        let field = |idx: usize| -> Result<f64> {
            let raw = &record[idx];
            raw.parse::<f64>().map_err(|_| {
                Error::data(format!(
                    "{name} line {line}: cannot parse {} from '{raw}'",
                    COLUMNS[idx]
                ))
            })
        };

        bars.push(Bar {
            ts: parse_timestamp(&record[0])
                .map_err(|e| Error::data(format!("{name} line {line}: {e}")))?,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
            adj_close: field(6)?,
        });
    }

    Ok(bars)
}

/// Load `<dir>/<symbol>.csv`.
pub fn load_symbol_csv(dir: &Path, symbol: &str) -> Result<Vec<Bar>> {
    let path = dir.join(format!("{symbol}.csv"));
    let file = std::fs::File::open(&path)
        .map_err(|e| Error::data(format!("open '{}': {e}", path.display())))?;
    let bars = read_bars(file, &path.display().to_string())?;
    debug!(symbol, bars = bars.len(), "loaded csv");
    Ok(bars)
}

/// Load every symbol from `dir`, keep bars within `[start, end]` and build an
/// aligned historic source.
pub fn load_csv_dir(
    dir: &Path,
    symbols: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<HistoricBarSource> {
    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let bars: Vec<Bar> = load_symbol_csv(dir, symbol)?
            .into_iter()
            .filter(|bar| {
                let date = bar.ts.date_naive();
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
            })
            .collect();
        if bars.is_empty() {
            return Err(Error::data(format!("no bars for {symbol} in the requested date range")));
        }
        series.push((symbol.clone(), bars));
    }

    let source = HistoricBarSource::from_series(series)?;
    info!(
        symbols = symbols.len(),
        bars = source.calendar().len(),
        dir = %dir.display(),
        "historic data ready"
    );
    Ok(source)
}
