//! Console tables for memory measurements

const COLUMN_SPACING: usize = 2;
const MEMORY_USAGE_TITLE: &str = "Data Structure Size (bytes)";

/// One row of a memory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Row label (index name, percentile, bracket count, ...).
    pub scenario: String,
    /// Measured size in bytes.
    pub bytes: usize,
}

impl MemoryUsage {
    /// Create a row.
    pub fn new(scenario: impl Into<String>, bytes: usize) -> Self {
        Self {
            scenario: scenario.into(),
            bytes,
        }
    }
}

/// Heading framed by `=` rules.
pub fn section_heading(heading: &str) -> String {
    let separator = "=".repeat(heading.chars().count());
    format!("{separator}\n{heading}\n{separator}\n")
}

/// Titled two-column table of memory usages.
pub fn memory_usage_table(title: &str, scenario_title: &str, results: &[MemoryUsage]) -> String {
    let rows: Vec<(String, String)> = results
        .iter()
        .map(|usage| (usage.scenario.clone(), format_count(usage.bytes)))
        .collect();

    let mut out = format!("{title}\n");
    out.push_str(&two_column_table(scenario_title, MEMORY_USAGE_TITLE, &rows));
    out
}

/// Left column padded to its widest entry plus spacing, `-` rule under the header.
pub fn two_column_table(left_title: &str, right_title: &str, rows: &[(String, String)]) -> String {
    let left_width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .chain(std::iter::once(left_title.chars().count()))
        .max()
        .unwrap_or(0)
        + COLUMN_SPACING;

    let header = format!("{left_title:<left_width$}{right_title}");
    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.chars().count()));
    out.push('\n');
    for (left, right) in rows {
        out.push_str(&format!("{left:<left_width$}{right}\n"));
    }
    out
}

/// Integer with `,` thousands separators.
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole-dollar amount with separators, e.g. `$350,000`.
pub fn format_dollars(dollars: u32) -> String {
    format!("${}", format_count(dollars as usize))
}
