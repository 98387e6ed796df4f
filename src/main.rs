// Entry point and high-level CLI flow.
//
// - Option [1] loads the statistics CSV, printing diagnostics.
// - Option [2] prompts for year/month/regions/theme and renders the
//   dashboard panels.
// - Option [3] exports the derived tables to CSV plus a JSON summary.
// - After a render or an export, the user can go back to the menu or exit.
mod aggregate;
mod dashboard;
mod loader;
mod output;
mod theme;
mod types;
mod util;

use aggregate::Measure;
use clap::Parser;
use dashboard::Selection;
use std::io::{self, Write};
use theme::Theme;
use types::{Dataset, DashboardSummary, RegionValue};
use util::format_int;

#[derive(Parser, Debug)]
#[command(about = "Interactive dashboard over livestock disease occurrence statistics")]
struct Args {
    /// Path to the statistics CSV (cp949-encoded)
    #[arg(long, default_value = "가축질병발생통계.csv")]
    data: String,
}

/// Per-run state: the dataset is loaded once and read-only afterward;
/// the selection persists between renders so Enter keeps previous choices.
struct Session {
    dataset: Option<Dataset>,
    selection: Option<Selection>,
}

fn read_line_trim(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    read_line_trim("Enter choice: ")
}

/// Ask the user whether to go back to the menu after a render or export.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line_trim("Back to Menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the CSV into the session.
///
/// On success the previous selection is reset, since the available years
/// and regions may have changed.
fn handle_load(path: &str, session: &mut Session) {
    match loader::load(path) {
        Ok((dataset, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                format_int(report.total_rows as i64),
                format_int(report.kept_rows as i64)
            );
            println!(
                "Note: {} rows skipped, {} cells coerced to missing.",
                format_int(report.skipped_rows as i64),
                format_int(report.coerced_cells as i64)
            );
            if report.total_derived {
                println!("Info: '{}' derived from region sums.", loader::TOTAL_COL);
            }
            println!();
            session.selection = Some(default_selection(&dataset));
            session.dataset = Some(dataset);
        }
        Err(e) => {
            eprintln!("Failed to load file: {:#}\n", e);
        }
    }
}

fn default_selection(dataset: &Dataset) -> Selection {
    // loader guarantees at least one record, so years() is non-empty
    let year = dataset.years()[0];
    Selection {
        year,
        month: dataset.latest_month(year).unwrap_or(12),
        regions: (0..dataset.schema.regions.len()).collect(),
        theme: theme::default_theme(),
    }
}

fn prompt_year(years: &[i32], current: i32) -> i32 {
    let listed: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    println!("Available years: {}", listed.join(", "));
    loop {
        let s = read_line_trim(&format!("Select year [{}]: ", current));
        if s.is_empty() {
            return current;
        }
        match s.parse::<i32>() {
            Ok(y) if years.contains(&y) => return y,
            _ => println!("Invalid year."),
        }
    }
}

/// Months are always offered as 1..=12; months without data render as 0.
fn prompt_month(current: u32) -> u32 {
    loop {
        let s = read_line_trim(&format!("Select month 1-12 [{}]: ", current));
        if s.is_empty() {
            return current;
        }
        match s.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => return m,
            _ => println!("Invalid month. Please enter 1-12."),
        }
    }
}

/// Multi-select over the region columns. `all` and `none` are accepted;
/// an empty selection is legal and puts the dashboard in its advisory
/// state. Chosen indices are kept in schema order.
fn prompt_regions(regions: &[String], current: &[usize]) -> Vec<usize> {
    let listed: Vec<String> = regions
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}", i + 1, r))
        .collect();
    println!("Regions: {}", listed.join(" "));
    let current_label = if current.len() == regions.len() {
        "all".to_string()
    } else if current.is_empty() {
        "none".to_string()
    } else {
        format!("{} selected", current.len())
    };
    loop {
        let s = read_line_trim(&format!(
            "Select regions (comma-separated numbers, 'all' or 'none') [{}]: ",
            current_label
        ));
        if s.is_empty() {
            return current.to_vec();
        }
        if s.eq_ignore_ascii_case("all") {
            return (0..regions.len()).collect();
        }
        if s.eq_ignore_ascii_case("none") {
            return Vec::new();
        }
        let parsed: Option<Vec<usize>> = s
            .split(',')
            .map(|part| match part.trim().parse::<usize>() {
                Ok(n) if (1..=regions.len()).contains(&n) => Some(n - 1),
                _ => None,
            })
            .collect();
        match parsed {
            Some(mut indices) => {
                indices.sort_unstable();
                indices.dedup();
                return indices;
            }
            None => println!("Invalid region list."),
        }
    }
}

fn prompt_theme(current: &'static Theme) -> &'static Theme {
    let listed: Vec<String> = theme::PALETTES
        .iter()
        .enumerate()
        .map(|(i, t)| format!("[{}] {}", i + 1, t.name))
        .collect();
    println!("Themes: {}", listed.join(" "));
    loop {
        let s = read_line_trim(&format!("Select theme [{}]: ", current.name));
        if s.is_empty() {
            return current;
        }
        if let Ok(n) = s.parse::<usize>() {
            if let Some(t) = theme::PALETTES.get(n.wrapping_sub(1)) {
                return t;
            }
        }
        if let Some(t) = theme::by_name(&s) {
            return t;
        }
        println!("Invalid theme.");
    }
}

/// Handle option [2]: refresh the selection and render the dashboard.
fn handle_view(session: &mut Session) {
    let Some(dataset) = session.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let current = session
        .selection
        .clone()
        .unwrap_or_else(|| default_selection(dataset));

    let year = prompt_year(&dataset.years(), current.year);
    // a year switch re-defaults the month to that year's latest data month
    let month_default = if year != current.year {
        dataset.latest_month(year).unwrap_or(12)
    } else {
        current.month
    };
    let selection = Selection {
        year,
        month: prompt_month(month_default),
        regions: prompt_regions(&dataset.schema.regions, &current.regions),
        theme: prompt_theme(current.theme),
    };

    println!();
    dashboard::render(dataset, &selection);
    session.selection = Some(selection);
}

/// Handle option [3]: export the derived tables and the JSON summary.
///
/// This function is intentionally side-effectful: it writes up to four CSV
/// files and `summary.json`, and prints a truncated preview of each table.
fn handle_export(session: &Session) {
    let Some(dataset) = session.dataset.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let selection = session
        .selection
        .clone()
        .unwrap_or_else(|| default_selection(dataset));

    println!("Generating exports for {}년 {}월...\n", selection.year, selection.month);

    let series = aggregate::monthly_series(dataset, selection.year, Measure::Total);
    let trend = dashboard::trend_rows(selection.year, &series);
    let trend_file = "monthly_trend.csv";
    if let Err(e) = output::write_csv(trend_file, &trend) {
        eprintln!("Write error: {}", e);
    }
    println!("Monthly trend ({}년)", selection.year);
    output::preview_table_rows(&trend, 3);
    println!("(Full table exported to {})\n", trend_file);

    let record = aggregate::select_record(dataset, selection.year, selection.month);
    let breakdown = aggregate::region_breakdown(&dataset.schema, &record, &selection.regions);
    match &breakdown {
        Some(b) => {
            let distribution = dashboard::distribution_rows(b);
            let dist_file = "region_distribution.csv";
            if let Err(e) = output::write_csv(dist_file, &distribution) {
                eprintln!("Write error: {}", e);
            }
            println!("Region distribution ({}년 {}월)", selection.year, selection.month);
            output::preview_table_rows(&distribution, 3);
            println!("(Full table exported to {})\n", dist_file);

            let top = dashboard::top_rows(b, 5);
            let top_file = "top5_regions.csv";
            if let Err(e) = output::write_csv(top_file, &top) {
                eprintln!("Write error: {}", e);
            }
            println!("Top 5 regions");
            output::preview_table_rows(&top, 5);
            println!("(Full table exported to {})\n", top_file);
        }
        None => println!("선택된 지역이 없어 지역별 내보내기를 건너뜁니다.\n"),
    }

    if let Some(hm) = aggregate::heatmap(dataset, selection.year, &selection.regions) {
        let heatmap_file = format!("heatmap_{}.csv", selection.year);
        if let Err(e) = output::write_heatmap_csv(&heatmap_file, &hm) {
            eprintln!("Write error: {}", e);
        }
        println!("(Heatmap exported to {})\n", heatmap_file);
    }

    let ytd = aggregate::ytd_summary(dataset, selection.year, selection.month);
    let summary = DashboardSummary {
        year: selection.year,
        month: selection.month,
        year_month: record.year_month,
        total_cases: record.total.unwrap_or(0),
        ytd: ytd.ytd,
        ytd_prev: ytd.prev.map(|p| p.ytd_prev),
        ytd_delta: ytd.prev.map(|p| p.delta),
        max_region: breakdown.as_ref().map(|b| RegionValue {
            region: b.max.0.clone(),
            cases: b.max.1,
        }),
        min_region: breakdown.as_ref().map(|b| RegionValue {
            region: b.min.0.clone(),
            cases: b.min.1,
        }),
        regions_selected: selection
            .regions
            .iter()
            .map(|&i| dataset.schema.regions[i].clone())
            .collect(),
        theme: selection.theme.clone(),
        generated_at: chrono::Local::now(),
    };
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary stats exported to summary.json\n");
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut session = Session {
        dataset: None,
        selection: None,
    };
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] View dashboard");
        println!("[3] Export reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&args.data, &mut session);
            }
            "2" => {
                println!();
                handle_view(&mut session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_export(&session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, or 3.\n");
            }
        }
    }
}
