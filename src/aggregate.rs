use crate::types::{Dataset, Record, Schema};

/// Which column a monthly series sums.
#[derive(Debug, Clone, Copy)]
pub enum Measure<'a> {
    /// The `소계` column (healed at load time when the source lacked it).
    Total,
    /// The sum of the given region columns, as indices into `Schema::regions`.
    Regions(&'a [usize]),
}

fn measure_of(record: &Record, measure: Measure) -> u64 {
    match measure {
        Measure::Total => record.total.unwrap_or(0),
        Measure::Regions(subset) => subset
            .iter()
            .map(|&i| record.values.get(i).copied().flatten().unwrap_or(0))
            .sum(),
    }
}

/// Guarantee a usable `소계` per record.
///
/// If the source had no `소계` column, or every value in it is missing,
/// each record's total is replaced by the row-wise sum of its region
/// values (missing regions count as 0). A present, non-empty column is
/// trusted as-is, even for rows where it is individually missing.
/// Idempotent.
pub fn ensure_total(schema: &Schema, records: &mut [Record]) {
    let unusable = !schema.has_total || records.iter().all(|r| r.total.is_none());
    if !unusable {
        return;
    }
    for r in records.iter_mut() {
        r.total = Some(r.values.iter().map(|v| v.unwrap_or(0)).sum());
    }
}

/// Sum `measure` per month for one year, reindexed onto the full 1..=12
/// range. Months absent from the source read 0 (a real value, not an
/// unknown); duplicate year-months sum. A year with no records yields
/// all zeros.
pub fn monthly_series(dataset: &Dataset, year: i32, measure: Measure) -> [u64; 12] {
    let mut series = [0u64; 12];
    for r in dataset.records.iter().filter(|r| r.year == year) {
        series[(r.month - 1) as usize] += measure_of(r, measure);
    }
    series
}

/// Cumulative sum of a monthly series through `month` (1-based, inclusive).
pub fn ytd(series: &[u64; 12], month: u32) -> u64 {
    series[..month as usize].iter().sum()
}

#[derive(Debug, Clone)]
pub struct YtdSummary {
    pub ytd: u64,
    /// Present only when the prior year has records; a missing prior year
    /// means no delta at all, not a delta of zero.
    pub prev: Option<YtdComparison>,
}

#[derive(Debug, Clone, Copy)]
pub struct YtdComparison {
    pub ytd_prev: u64,
    pub delta: i64,
}

/// Year-to-date total for `(year, 1..=month)` plus the year-over-year
/// comparison against the same partial sum of `year - 1`.
pub fn ytd_summary(dataset: &Dataset, year: i32, month: u32) -> YtdSummary {
    let series = monthly_series(dataset, year, Measure::Total);
    let current = ytd(&series, month);
    let prev = if dataset.has_year(year - 1) {
        let prev_series = monthly_series(dataset, year - 1, Measure::Total);
        let ytd_prev = ytd(&prev_series, month);
        Some(YtdComparison {
            ytd_prev,
            delta: current as i64 - ytd_prev as i64,
        })
    } else {
        None
    };
    YtdSummary { ytd: current, prev }
}

/// The record for one year-month, with duplicates summed.
///
/// When the period is absent from the source this returns an all-zero
/// synthetic record, so every displayed metric reads 0 instead of
/// surfacing a missing-data fault or stale data from another period.
pub fn select_record(dataset: &Dataset, year: i32, month: u32) -> Record {
    let mut values = vec![0u64; dataset.schema.regions.len()];
    let mut total = 0u64;
    for r in dataset
        .records
        .iter()
        .filter(|r| r.year == year && r.month == month)
    {
        for (acc, v) in values.iter_mut().zip(&r.values) {
            *acc += v.unwrap_or(0);
        }
        total += r.total.unwrap_or(0);
    }
    Record {
        year_month: (year * 100 + month as i32) as u32,
        year,
        month,
        values: values.into_iter().map(Some).collect(),
        total: Some(total),
    }
}

/// Per-region sums over one record, in subset order.
#[derive(Debug, Clone)]
pub struct RegionBreakdown {
    /// (region name, summed value), subset order preserved.
    pub sums: Vec<(String, u64)>,
    pub total: u64,
    pub max: (String, u64),
    pub min: (String, u64),
}

impl RegionBreakdown {
    /// Regions sorted by value descending, first-seen order on ties,
    /// truncated to `n`.
    pub fn top_n(&self, n: usize) -> Vec<(String, u64)> {
        let mut sorted = self.sums.clone();
        // stable sort keeps subset order between equal values
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

/// `None` when the subset is empty; callers render an advisory instead of
/// aggregating over nothing.
pub fn region_breakdown(
    schema: &Schema,
    record: &Record,
    subset: &[usize],
) -> Option<RegionBreakdown> {
    if subset.is_empty() {
        return None;
    }
    let sums: Vec<(String, u64)> = subset
        .iter()
        .map(|&i| {
            (
                schema.regions[i].clone(),
                record.values.get(i).copied().flatten().unwrap_or(0),
            )
        })
        .collect();
    let total = sums.iter().map(|(_, v)| *v).sum();
    let mut max = sums[0].clone();
    let mut min = sums[0].clone();
    for entry in &sums[1..] {
        // strict comparisons: the first region in subset order wins ties
        if entry.1 > max.1 {
            max = entry.clone();
        }
        if entry.1 < min.1 {
            min = entry.clone();
        }
    }
    Some(RegionBreakdown {
        sums,
        total,
        max,
        min,
    })
}

/// Region × month matrix of summed values for one year.
#[derive(Debug, Clone)]
pub struct Heatmap {
    /// Row labels, subset order.
    pub regions: Vec<String>,
    /// `rows[r][m]` is the value for region `r` in month `m + 1`.
    pub rows: Vec<[u64; 12]>,
}

/// `None` when the subset is empty. Otherwise the full cartesian product
/// of subset regions × months 1..=12, zero-filled for every (month,
/// region) pair absent from the source; duplicate year-months sum.
pub fn heatmap(dataset: &Dataset, year: i32, subset: &[usize]) -> Option<Heatmap> {
    if subset.is_empty() {
        return None;
    }
    let mut rows = vec![[0u64; 12]; subset.len()];
    for rec in dataset.records.iter().filter(|r| r.year == year) {
        let m = (rec.month - 1) as usize;
        for (row, &region_idx) in rows.iter_mut().zip(subset) {
            row[m] += rec.values.get(region_idx).copied().flatten().unwrap_or(0);
        }
    }
    Some(Heatmap {
        regions: subset
            .iter()
            .map(|&i| dataset.schema.regions[i].clone())
            .collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year_month: u32, values: &[Option<u64>], total: Option<u64>) -> Record {
        Record {
            year_month,
            year: (year_month / 100) as i32,
            month: year_month % 100,
            values: values.to_vec(),
            total,
        }
    }

    fn dataset(regions: &[&str], has_total: bool, records: Vec<Record>) -> Dataset {
        Dataset {
            schema: Schema {
                regions: regions.iter().map(|r| r.to_string()).collect(),
                has_total,
            },
            records,
        }
    }

    #[test]
    fn ensure_total_derives_when_column_absent() {
        let mut ds = dataset(
            &["A", "B"],
            false,
            vec![
                record(202301, &[Some(3), Some(4)], None),
                record(202302, &[None, Some(5)], None),
            ],
        );
        ensure_total(&ds.schema, &mut ds.records);
        assert_eq!(ds.records[0].total, Some(7));
        // missing region values count as 0 in the derived sum
        assert_eq!(ds.records[1].total, Some(5));
    }

    #[test]
    fn ensure_total_derives_when_column_entirely_empty() {
        let mut ds = dataset(
            &["A", "B"],
            true,
            vec![
                record(202301, &[Some(1), Some(2)], None),
                record(202302, &[Some(3), Some(4)], None),
            ],
        );
        ensure_total(&ds.schema, &mut ds.records);
        assert_eq!(ds.records[0].total, Some(3));
        assert_eq!(ds.records[1].total, Some(7));
    }

    #[test]
    fn ensure_total_trusts_partially_missing_column() {
        // a present, non-empty column is not healed row by row, even when
        // inconsistent with the region sums
        let mut ds = dataset(
            &["A", "B"],
            true,
            vec![
                record(202301, &[Some(1), Some(2)], Some(99)),
                record(202302, &[Some(3), Some(4)], None),
            ],
        );
        ensure_total(&ds.schema, &mut ds.records);
        assert_eq!(ds.records[0].total, Some(99));
        assert_eq!(ds.records[1].total, None);
    }

    #[test]
    fn ensure_total_is_idempotent() {
        let mut once = dataset(
            &["A", "B"],
            false,
            vec![record(202301, &[Some(3), None], None)],
        );
        ensure_total(&once.schema, &mut once.records);
        let mut twice = once.clone();
        ensure_total(&twice.schema, &mut twice.records);
        assert_eq!(once.records[0].total, twice.records[0].total);
    }

    #[test]
    fn monthly_series_zero_fills_absent_months() {
        let ds = dataset(
            &["A"],
            true,
            vec![
                record(202303, &[Some(10)], Some(10)),
                record(202307, &[Some(20)], Some(20)),
            ],
        );
        let series = monthly_series(&ds, 2023, Measure::Total);
        assert_eq!(series, [0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn monthly_series_sums_duplicate_year_months() {
        let ds = dataset(
            &["A"],
            true,
            vec![
                record(202305, &[Some(2)], Some(2)),
                record(202305, &[Some(3)], Some(3)),
            ],
        );
        let series = monthly_series(&ds, 2023, Measure::Total);
        assert_eq!(series[4], 5);
    }

    #[test]
    fn monthly_series_for_empty_year_is_all_zero() {
        let ds = dataset(&["A"], true, vec![record(202203, &[Some(9)], Some(9))]);
        assert_eq!(monthly_series(&ds, 2023, Measure::Total), [0; 12]);
    }

    #[test]
    fn monthly_series_over_region_subset() {
        let ds = dataset(
            &["A", "B", "C"],
            true,
            vec![record(202301, &[Some(1), Some(2), Some(4)], Some(7))],
        );
        let series = monthly_series(&ds, 2023, Measure::Regions(&[0, 2]));
        assert_eq!(series[0], 5);
    }

    #[test]
    fn ytd_matches_partial_sums() {
        let series = [0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 0, 0];
        assert_eq!(ytd(&series, 7), 30);
        assert_eq!(ytd(&series, 2), 0);
        assert_eq!(ytd(&series, 12), 30);
    }

    #[test]
    fn ytd_is_monotone_over_cutoff_month() {
        let series = [1, 0, 5, 2, 0, 0, 7, 0, 3, 0, 0, 4];
        for m in 1..12u32 {
            assert!(ytd(&series, m + 1) >= ytd(&series, m));
        }
    }

    #[test]
    fn ytd_summary_compares_against_prior_year() {
        let ds = dataset(
            &["A"],
            true,
            vec![
                record(202202, &[Some(4)], Some(4)),
                record(202303, &[Some(10)], Some(10)),
            ],
        );
        let summary = ytd_summary(&ds, 2023, 3);
        assert_eq!(summary.ytd, 10);
        let prev = summary.prev.expect("2022 has records");
        assert_eq!(prev.ytd_prev, 4);
        assert_eq!(prev.delta, 6);
    }

    #[test]
    fn ytd_summary_omits_delta_without_prior_year() {
        let ds = dataset(&["A"], true, vec![record(202303, &[Some(10)], Some(10))]);
        let summary = ytd_summary(&ds, 2023, 6);
        assert_eq!(summary.ytd, 10);
        assert!(summary.prev.is_none());
    }

    #[test]
    fn ytd_summary_handles_year_with_no_records() {
        let ds = dataset(&["A"], true, vec![record(202203, &[Some(4)], Some(4))]);
        let summary = ytd_summary(&ds, 2023, 12);
        assert_eq!(summary.ytd, 0);
        // 2022 exists, so the comparison is still produced
        assert_eq!(summary.prev.unwrap().delta, -4);
    }

    #[test]
    fn select_record_substitutes_all_zero_synthetic() {
        let ds = dataset(&["A", "B"], true, vec![record(202301, &[Some(1), Some(2)], Some(3))]);
        let rec = select_record(&ds, 2023, 9);
        assert_eq!(rec.year_month, 202309);
        assert_eq!(rec.total, Some(0));
        assert!(rec.values.iter().all(|v| *v == Some(0)));
    }

    #[test]
    fn select_record_sums_duplicates_and_missing_cells() {
        let ds = dataset(
            &["A", "B"],
            true,
            vec![
                record(202301, &[Some(1), None], Some(1)),
                record(202301, &[Some(2), Some(3)], None),
            ],
        );
        let rec = select_record(&ds, 2023, 1);
        assert_eq!(rec.values, vec![Some(3), Some(3)]);
        assert_eq!(rec.total, Some(1));
    }

    #[test]
    fn region_breakdown_breaks_ties_by_subset_order() {
        let ds = dataset(
            &["A", "B", "C"],
            true,
            vec![record(202301, &[Some(5), Some(5), Some(3)], Some(13))],
        );
        let rec = select_record(&ds, 2023, 1);
        let b = region_breakdown(&ds.schema, &rec, &[0, 1, 2]).unwrap();
        assert_eq!(b.total, 13);
        assert_eq!(b.max, ("A".to_string(), 5));
        assert_eq!(b.min, ("C".to_string(), 3));
        let top = b.top_n(2);
        assert_eq!(top, vec![("A".to_string(), 5), ("B".to_string(), 5)]);
    }

    #[test]
    fn region_breakdown_respects_subset_selection() {
        let ds = dataset(
            &["A", "B", "C"],
            true,
            vec![record(202301, &[Some(9), Some(1), Some(3)], Some(13))],
        );
        let rec = select_record(&ds, 2023, 1);
        let b = region_breakdown(&ds.schema, &rec, &[1, 2]).unwrap();
        assert_eq!(b.total, 4);
        assert_eq!(b.max, ("C".to_string(), 3));
        assert_eq!(b.min, ("B".to_string(), 1));
    }

    #[test]
    fn empty_region_subset_yields_no_breakdown() {
        let ds = dataset(&["A"], true, vec![record(202301, &[Some(1)], Some(1))]);
        let rec = select_record(&ds, 2023, 1);
        assert!(region_breakdown(&ds.schema, &rec, &[]).is_none());
        assert!(heatmap(&ds, 2023, &[]).is_none());
    }

    #[test]
    fn heatmap_covers_full_region_month_grid() {
        let ds = dataset(
            &["A", "B"],
            true,
            vec![
                record(202303, &[Some(10), None], Some(10)),
                record(202307, &[Some(20), Some(1)], Some(21)),
            ],
        );
        let hm = heatmap(&ds, 2023, &[0, 1]).unwrap();
        assert_eq!(hm.regions, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(hm.rows.len(), 2);
        assert_eq!(hm.rows[0], [0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 0, 0]);
        assert_eq!(hm.rows[1], [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn heatmap_sums_duplicate_year_months() {
        let ds = dataset(
            &["A"],
            true,
            vec![
                record(202304, &[Some(2)], Some(2)),
                record(202304, &[Some(5)], Some(5)),
            ],
        );
        let hm = heatmap(&ds, 2023, &[0]).unwrap();
        assert_eq!(hm.rows[0][3], 7);
    }
}
