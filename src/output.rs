use crate::aggregate::Heatmap;
use anyhow::Result;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// The heatmap has one column per month, so it is written record by record
/// instead of through a serialized row struct.
pub fn write_heatmap_csv(path: &str, heatmap: &Heatmap) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["지역".to_string()];
    header.extend((1..=12).map(|m| format!("{}월", m)));
    wtr.write_record(&header)?;
    for (region, row) in heatmap.regions.iter().zip(&heatmap.rows) {
        let mut record = vec![region.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
