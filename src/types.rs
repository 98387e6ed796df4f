use serde::Serialize;
use tabled::Tabled;

/// Column layout detected once from the CSV header.
///
/// `regions` is every header column except the `연월` key and the `소계`
/// total, in file order. That order is load-bearing: max/min/top-N ties
/// resolve to the first region in this order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub regions: Vec<String>,
    /// Whether the source header carried a `소계` column at all.
    pub has_total: bool,
}

/// One source row: a single year-month with per-region occurrence counts.
#[derive(Debug, Clone)]
pub struct Record {
    /// YYYY*100 + MM, e.g. 202303.
    pub year_month: u32,
    pub year: i32,
    /// Always 1..=12 after loading.
    pub month: u32,
    /// Parallel to `Schema::regions`; `None` marks a cell that did not
    /// parse as a nonnegative count.
    pub values: Vec<Option<u64>>,
    /// The `소계` cell; `None` when missing in the source.
    pub total: Option<u64>,
}

/// The loaded table. Built once by the loader and read-only afterward;
/// every derived structure is recomputed from it on each selection change.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Distinct years present in the data, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.records.iter().any(|r| r.year == year)
    }

    /// Largest month with at least one record in `year`.
    pub fn latest_month(&self, year: i32) -> Option<u32> {
        self.records
            .iter()
            .filter(|r| r.year == year)
            .map(|r| r.month)
            .max()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyTrendRow {
    #[serde(rename = "연월")]
    #[tabled(rename = "연월")]
    pub year_month: u32,
    #[serde(rename = "월")]
    #[tabled(rename = "월")]
    pub month: u32,
    #[serde(rename = "발생건수")]
    #[tabled(rename = "발생건수")]
    pub cases: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionDistributionRow {
    #[serde(rename = "지역")]
    #[tabled(rename = "지역")]
    pub region: String,
    #[serde(rename = "발생건수")]
    #[tabled(rename = "발생건수")]
    pub cases: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopRegionRow {
    #[serde(rename = "순위")]
    #[tabled(rename = "순위")]
    pub rank: usize,
    #[serde(rename = "지역")]
    #[tabled(rename = "지역")]
    pub region: String,
    #[serde(rename = "발생건수")]
    #[tabled(rename = "발생건수")]
    pub cases: u64,
}

/// Scalar metrics for the selected period, exported as `summary.json`.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub year: i32,
    pub month: u32,
    pub year_month: u32,
    pub total_cases: u64,
    pub ytd: u64,
    pub ytd_prev: Option<u64>,
    pub ytd_delta: Option<i64>,
    pub max_region: Option<RegionValue>,
    pub min_region: Option<RegionValue>,
    pub regions_selected: Vec<String>,
    pub theme: crate::theme::Theme,
    pub generated_at: chrono::DateTime<chrono::Local>,
}

#[derive(Debug, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub cases: u64,
}
