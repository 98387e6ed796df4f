use crate::aggregate::{self, Heatmap, Measure, RegionBreakdown};
use crate::theme::Theme;
use crate::types::{Dataset, MonthlyTrendRow, RegionDistributionRow, TopRegionRow};
use crate::util::{format_int, format_signed};
use tabled::builder::Builder;

/// One render's worth of user parameters.
#[derive(Debug, Clone)]
pub struct Selection {
    pub year: i32,
    /// Always offered as 1..=12, whether or not the year has data for it.
    pub month: u32,
    /// Indices into `Schema::regions`, kept in schema order.
    pub regions: Vec<usize>,
    pub theme: &'static Theme,
}

const BAR_WIDTH: usize = 24;

/// Render the full dashboard for the current selection.
///
/// Layout follows the original three panels: key metrics with the monthly
/// trend, the regional distribution with the yearly heatmap, and the top-5
/// ranking with the data notes. Panels that need at least one region show
/// an advisory line instead when the selection is empty.
pub fn render(dataset: &Dataset, sel: &Selection) {
    println!("{}", "=".repeat(72));
    println!(
        "가축 질병 발생 대시보드  |  {}년 {}월  |  테마: {}",
        sel.year, sel.month, sel.theme.name
    );
    println!("{}", "=".repeat(72));

    let record = aggregate::select_record(dataset, sel.year, sel.month);
    let breakdown = aggregate::region_breakdown(&dataset.schema, &record, &sel.regions);

    section("핵심 지표");
    println!("전체 발생 건수: {}", format_int(record.total.unwrap_or(0)));
    let ytd = aggregate::ytd_summary(dataset, sel.year, sel.month);
    match ytd.prev {
        Some(prev) => println!(
            "연도 누계(YTD) {}년 1~{}월: {} (전년 동기 대비 {})",
            sel.year,
            sel.month,
            format_int(ytd.ytd),
            format_signed(prev.delta)
        ),
        None => println!(
            "연도 누계(YTD) {}년 1~{}월: {}",
            sel.year,
            sel.month,
            format_int(ytd.ytd)
        ),
    }
    match &breakdown {
        Some(b) => {
            println!("최다 발생 지역: {} ({})", b.max.0, format_int(b.max.1));
            println!("최소 발생 지역: {} ({})", b.min.0, format_int(b.min.1));
        }
        None => println!("선택된 지역이 없습니다. 지역을 하나 이상 선택하세요."),
    }

    section("월별 발생 추세");
    let series = aggregate::monthly_series(dataset, sel.year, Measure::Total);
    println!("{}", trend_table(sel.year, &series, sel.theme));

    section("지역별 발생 분포");
    match &breakdown {
        Some(b) => println!("{}", distribution_table(b, sel.theme)),
        None => println!("지역을 하나 이상 선택하세요."),
    }

    section("연도별 지역 발생 히트맵");
    match aggregate::heatmap(dataset, sel.year, &sel.regions) {
        Some(hm) => println!("{}", heatmap_table(&hm, sel.theme)),
        None => println!("히트맵을 보려면 지역을 하나 이상 선택하세요."),
    }

    section("Top 지역 랭킹");
    match &breakdown {
        Some(b) => println!("{}", top_table(b, sel.theme)),
        None => println!("지역을 선택해 주세요."),
    }

    section("데이터 설명");
    println!("- 데이터 출처: 농림축산식품부 가축질병 발생 통계");
    println!("- 분석 단위: 연월 기준, 시도별 집계");
    println!("- 주의: 일부 결측치가 있을 수 있으며, '소계'는 전국 총합입니다.");
    println!("- 활용: 방역 자원 배분, 지역/시기별 집중 발생 모니터링, 연도별 패턴 분석 등");
    println!();
}

pub fn trend_rows(year: i32, series: &[u64; 12]) -> Vec<MonthlyTrendRow> {
    series
        .iter()
        .enumerate()
        .map(|(i, cases)| {
            let month = i as u32 + 1;
            MonthlyTrendRow {
                year_month: (year * 100 + month as i32) as u32,
                month,
                cases: *cases,
            }
        })
        .collect()
}

/// Per-region rows sorted ascending by count, as the original's horizontal
/// bar chart orders them; the sort is stable, so ties keep subset order.
pub fn distribution_rows(breakdown: &RegionBreakdown) -> Vec<RegionDistributionRow> {
    let mut rows: Vec<RegionDistributionRow> = breakdown
        .sums
        .iter()
        .map(|(region, cases)| RegionDistributionRow {
            region: region.clone(),
            cases: *cases,
        })
        .collect();
    rows.sort_by(|a, b| a.cases.cmp(&b.cases));
    rows
}

pub fn top_rows(breakdown: &RegionBreakdown, n: usize) -> Vec<TopRegionRow> {
    breakdown
        .top_n(n)
        .into_iter()
        .enumerate()
        .map(|(i, (region, cases))| TopRegionRow {
            rank: i + 1,
            region,
            cases,
        })
        .collect()
}

fn section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(72));
}

fn trend_table(year: i32, series: &[u64; 12], theme: &Theme) -> String {
    let peak = series.iter().copied().max().unwrap_or(0);
    let mut builder = Builder::default();
    builder.push_record(["연월", "발생건수", "추세"]);
    for row in trend_rows(year, series) {
        builder.push_record([
            row.year_month.to_string(),
            format_int(row.cases),
            bar(row.cases, peak),
        ]);
    }
    let mut table = builder.build();
    theme.style_table(&mut table);
    table.to_string()
}

fn distribution_table(breakdown: &RegionBreakdown, theme: &Theme) -> String {
    let rows = distribution_rows(breakdown);
    let peak = rows.iter().map(|r| r.cases).max().unwrap_or(0);
    let mut builder = Builder::default();
    builder.push_record(["지역", "발생건수", "분포"]);
    for row in &rows {
        builder.push_record([row.region.clone(), format_int(row.cases), bar(row.cases, peak)]);
    }
    let mut table = builder.build();
    theme.style_table(&mut table);
    table.to_string()
}

fn heatmap_table(heatmap: &Heatmap, theme: &Theme) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["지역".to_string()];
    header.extend((1..=12).map(|m| format!("{}월", m)));
    builder.push_record(header);
    for (region, row) in heatmap.regions.iter().zip(&heatmap.rows) {
        let mut record = vec![region.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        builder.push_record(record);
    }
    let mut table = builder.build();
    theme.style_table(&mut table);
    table.to_string()
}

fn top_table(breakdown: &RegionBreakdown, theme: &Theme) -> String {
    let mut builder = Builder::default();
    builder.push_record(["순위", "지역", "발생건수"]);
    for row in top_rows(breakdown, 5) {
        builder.push_record([row.rank.to_string(), row.region, format_int(row.cases)]);
    }
    let mut table = builder.build();
    theme.style_table(&mut table);
    table.to_string()
}

/// Proportional text bar, scaled against the column's peak value.
fn bar(value: u64, peak: u64) -> String {
    if peak == 0 {
        return String::new();
    }
    let len = ((value as f64 / peak as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Record, Schema};

    fn breakdown() -> RegionBreakdown {
        let schema = Schema {
            regions: vec!["A".into(), "B".into(), "C".into()],
            has_total: true,
        };
        let record = Record {
            year_month: 202301,
            year: 2023,
            month: 1,
            values: vec![Some(5), Some(5), Some(3)],
            total: Some(13),
        };
        aggregate::region_breakdown(&schema, &record, &[0, 1, 2]).unwrap()
    }

    #[test]
    fn trend_rows_cover_all_twelve_months() {
        let rows = trend_rows(2023, &[0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 0, 0]);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].year_month, 202301);
        assert_eq!(rows[6].cases, 20);
    }

    #[test]
    fn distribution_rows_sort_ascending_keeping_ties_stable() {
        let rows = distribution_rows(&breakdown());
        let order: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn top_rows_rank_from_one() {
        let rows = top_rows(&breakdown(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].region, "A");
        assert_eq!(rows[1].region, "B");
    }

    #[test]
    fn bar_scales_against_peak() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(24, 24).chars().count(), BAR_WIDTH);
        assert_eq!(bar(12, 24).chars().count(), BAR_WIDTH / 2);
    }
}
