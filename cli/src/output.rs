/// cli/src/output.rs
/// Output utilities for the canopy CLI
/// description: styled diagnostics, the multi-file progress bar and the
/// node-kind summary table.

use std::collections::BTreeMap;

use canopy_core::{CanopyErrorExt, Level, generate_error_report};
use comfy_table::{Cell, ContentArrangement, Table, presets};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Styles for the different kinds of message the CLI prints.
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error | Level::Critical => &self.error,
        }
    }
}

/// Render an error report, coloured by its level.
pub fn render_error(error: &dyn CanopyErrorExt, formatting: &FormatStyle) -> String {
    formatting
        .for_level(error.level())
        .apply_to(generate_error_report(error))
        .to_string()
}

pub fn render_warning(text: &str, formatting: &FormatStyle) -> String {
    formatting.warning.apply_to(text).to_string()
}

/// A bar for runs over several inputs, hidden for a single one.
pub fn progress_bar(total: usize) -> ProgressBar {
    if total <= 1 {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▒░");
    let bar = ProgressBar::new(total as u64);
    bar.set_style(style);
    bar
}

/// One translated function in the summary table.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub file: String,
    pub name: String,
    pub qualified_name: String,
    pub line: usize,
    pub node_count: usize,
    pub kinds: BTreeMap<String, usize>,
}

/// Kinds shown per row, most frequent first.
const TOP_KINDS: usize = 5;

pub fn summary_table(rows: &[SummaryRow], formatting: &FormatStyle) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(formatting.title.apply_to("File").to_string()),
            Cell::new(formatting.title.apply_to("Function").to_string()),
            Cell::new(formatting.title.apply_to("Declared in").to_string()),
            Cell::new(formatting.title.apply_to("Line").to_string()),
            Cell::new(formatting.title.apply_to("Nodes").to_string()),
            Cell::new(formatting.title.apply_to("Top kinds").to_string()),
        ]);

    for row in rows {
        let declared_in = if row.qualified_name.is_empty() {
            "<top level>".to_string()
        } else {
            row.qualified_name.clone()
        };
        table.add_row(vec![
            Cell::new(&row.file),
            Cell::new(formatting.success.apply_to(&row.name).to_string()),
            Cell::new(declared_in),
            Cell::new(row.line),
            Cell::new(row.node_count),
            Cell::new(top_kinds(&row.kinds)),
        ]);
    }

    table
}

fn top_kinds(kinds: &BTreeMap<String, usize>) -> String {
    let mut ranked: Vec<(&String, &usize)> = kinds.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_KINDS)
        .map(|(kind, count)| format!("{} x{}", kind, count))
        .collect::<Vec<_>>()
        .join(", ")
}
