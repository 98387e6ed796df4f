use once_cell::sync::Lazy;
use serde::Serialize;
use tabled::{settings::Style, Table};

/// Border flavor a theme applies to dashboard tables.
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    Modern,
    Rounded,
    Sharp,
}

/// A named visual theme.
///
/// The hex scales are carried through to the JSON export so a graphical
/// front end can restyle its charts; the terminal rendering only uses the
/// table border flavor.
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub name: &'static str,
    /// Continuous color scale, dark to light.
    pub cont: [&'static str; 5],
    /// Sequential scale for multi-series charts.
    pub seq: [&'static str; 5],
    #[serde(skip)]
    pub table_style: TableStyle,
}

impl Theme {
    pub fn style_table(&self, table: &mut Table) {
        match self.table_style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
        };
    }
}

pub static PALETTES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            name: "TealMint",
            cont: ["#003f5c", "#2f8797", "#42b3a4", "#7dd6c9", "#b9f1e3"],
            seq: ["#2a9d8f", "#38a3a5", "#56cfe1", "#80ed99", "#57cc99"],
            table_style: TableStyle::Modern,
        },
        Theme {
            name: "IndigoRose",
            cont: ["#2b2d42", "#3f3351", "#6d597a", "#b56576", "#eaac8b"],
            seq: ["#3f3351", "#6d597a", "#b56576", "#e56b6f", "#eaac8b"],
            table_style: TableStyle::Rounded,
        },
        Theme {
            name: "SlateSunset",
            cont: ["#0f172a", "#334155", "#64748b", "#eab308", "#f59e0b"],
            seq: ["#334155", "#475569", "#64748b", "#eab308", "#f59e0b"],
            table_style: TableStyle::Sharp,
        },
    ]
});

/// The dashboard opens with the first palette, TealMint.
pub fn default_theme() -> &'static Theme {
    &PALETTES[0]
}

pub fn by_name(name: &str) -> Option<&'static Theme> {
    PALETTES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_the_three_palettes() {
        let names: Vec<&str> = PALETTES.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["TealMint", "IndigoRose", "SlateSunset"]);
        assert_eq!(default_theme().name, "TealMint");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(by_name("indigorose").unwrap().name, "IndigoRose");
        assert!(by_name("NoSuchTheme").is_none());
    }
}
