use crate::aggregate;
use crate::types::{Dataset, Record, Schema};
use crate::util::{parse_count, parse_year_month};
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use encoding_rs::EUC_KR;
use log::{debug, info};

/// Year-month key column, YYYYMM.
pub const YEAR_MONTH_COL: &str = "연월";
/// Nationwide total column; derived from the region columns when absent.
pub const TOTAL_COL: &str = "소계";

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub skipped_rows: usize,
    /// Cells that held something unparseable and were coerced to missing.
    pub coerced_cells: usize,
    /// Whether `소계` had to be derived from the region sums.
    pub total_derived: bool,
}

/// Load the statistics CSV into an immutable `Dataset`.
///
/// The source file is published in cp949; EUC-KR covers its extension.
/// Region columns are whatever the header carries besides `연월` and
/// `소계`, in file order. Unparseable numeric cells become missing values,
/// never errors; an unreadable file or a header without `연월` is fatal.
pub fn load(path: &str) -> Result<(Dataset, LoadReport)> {
    let raw = std::fs::read(path).with_context(|| format!("cannot read {}", path))?;
    let (text, _, had_errors) = EUC_KR.decode(&raw);
    if had_errors {
        debug!("{}: replacement characters while decoding cp949", path);
    }
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .with_context(|| format!("{}: cannot read CSV header", path))?
        .clone();
    let ym_idx = headers
        .iter()
        .position(|h| h.trim() == YEAR_MONTH_COL)
        .with_context(|| format!("{}: no {} column in header", path, YEAR_MONTH_COL))?;
    let total_idx = headers.iter().position(|h| h.trim() == TOTAL_COL);
    let region_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ym_idx && Some(*i) != total_idx)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let schema = Schema {
        regions: region_cols.iter().map(|(_, name)| name.clone()).collect(),
        has_total: total_idx.is_some(),
    };

    let mut records: Vec<Record> = Vec::new();
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut coerced_cells = 0usize;

    for row in rdr.records() {
        total_rows += 1;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("row {}: {}", total_rows, e);
                skipped_rows += 1;
                continue;
            }
        };

        let Some(year_month) = parse_year_month(row.get(ym_idx).unwrap_or("")) else {
            debug!(
                "row {}: unusable {} value {:?}",
                total_rows,
                YEAR_MONTH_COL,
                row.get(ym_idx)
            );
            skipped_rows += 1;
            continue;
        };

        let mut values = Vec::with_capacity(region_cols.len());
        for (idx, name) in &region_cols {
            let cell = row.get(*idx);
            let parsed = parse_count(cell);
            if parsed.is_none() && cell.is_some_and(|c| !c.trim().is_empty()) {
                debug!(
                    "row {} ({}): coerced {:?} in {} to missing",
                    total_rows, year_month, cell, name
                );
                coerced_cells += 1;
            }
            values.push(parsed);
        }

        records.push(Record {
            year_month,
            year: (year_month / 100) as i32,
            month: year_month % 100,
            values,
            total: total_idx.and_then(|i| parse_count(row.get(i))),
        });
    }

    if records.is_empty() {
        bail!("{}: no usable rows", path);
    }

    let total_derived = !schema.has_total || records.iter().all(|r| r.total.is_none());
    aggregate::ensure_total(&schema, &mut records);

    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        skipped_rows,
        coerced_cells,
        total_derived,
    };
    info!(
        "{}: {} rows kept, {} skipped, {} cells coerced",
        path, report.kept_rows, report.skipped_rows, report.coerced_cells
    );
    Ok((Dataset { schema, records }, report))
}
