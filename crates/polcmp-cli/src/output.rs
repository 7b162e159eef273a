use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use colored::Colorize;
use polcmp_compare::{ComparisonReport, ComparisonRow, Outcome, Summary};
use serde::Serialize;

/// What `--output-dir` receives.
#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: DateTime<Local>,
    headers: [&'a str; 4],
    summary: Summary,
    rows: &'a [ComparisonRow],
}

/// Numbered variants tried when reports land in the same second.
const MAX_NAME_ATTEMPTS: usize = 100;

fn report_file_stem(now: DateTime<Local>) -> String {
    format!("PolicyCompare_{}", now.format("%d%m%Y%H%M%S"))
}

pub fn report_file_name(now: DateTime<Local>) -> String {
    format!("{}.json", report_file_stem(now))
}

/// Write `report` into `dir` under a timestamped name and return the path.
/// An existing report is never overwritten; a numbered name is used instead.
pub fn write_report(report: &ComparisonReport, dir: &Path, now: DateTime<Local>) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let contents = ReportFile {
        generated_at: now,
        headers: report.headers(),
        summary: report.summary(),
        rows: &report.rows,
    };
    let json = serde_json::to_string_pretty(&contents)?;

    let (path, mut file) = create_report_file(dir, now)?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = report.len(), "report written");
    Ok(path)
}

fn create_report_file(dir: &Path, now: DateTime<Local>) -> anyhow::Result<(PathBuf, File)> {
    let stem = report_file_stem(now);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => format!("{stem}.json"),
            n => format!("{stem}_{n}.json"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!(path = %path.display(), "report file already exists, trying the next name");
            }
            Err(e) => return Err(e).with_context(|| format!("creating {}", path.display())),
        }
    }
    bail!("no free report file name for {stem} in {}", dir.display())
}

/// Four-column console table followed by a one-line summary.
pub fn render_table(report: &ComparisonReport, only_differences: bool) -> String {
    let rows: Vec<[String; 4]> = report
        .rows
        .iter()
        .filter(|r| !only_differences || matches!(r.outcome, Outcome::Diff | Outcome::Conflict))
        .map(|r| [r.key.clone(), r.left.to_string(), r.right.to_string(), r.outcome.to_string()])
        .collect();

    let headers = report.headers();
    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(&headers.map(|h| h.bold().to_string()), &headers.map(str::to_string), &widths));
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    out.push('\n');
    for row in &rows {
        let status = colorize(&row[3]);
        let styled = [row[0].clone(), row[1].clone(), row[2].clone(), status];
        out.push_str(&format_line(&styled, row, &widths));
    }

    let s = report.summary();
    out.push_str(&format!(
        "\n{} match, {} diff, {} conflict ({} settings compared)\n",
        s.matches.to_string().green(),
        s.diffs.to_string().yellow(),
        s.conflicts.to_string().red(),
        s.matches + s.diffs + s.conflicts,
    ));
    out
}

/// Pad on the plain text so ANSI codes do not skew column widths.
fn format_line(styled: &[String; 4], plain: &[String; 4], widths: &[usize; 4]) -> String {
    let cells: Vec<String> = styled
        .iter()
        .zip(plain)
        .zip(widths)
        .map(|((s, p), w)| format!("{s}{}", " ".repeat(w - p.chars().count())))
        .collect();
    format!("{}\n", cells.join(" | ").trim_end())
}

fn colorize(status: &str) -> String {
    match status {
        "MATCH" => status.green().to_string(),
        "DIFF" => status.yellow().to_string(),
        "CONFLICT" => status.red().bold().to_string(),
        _ => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use polcmp_compare::{compare, CompareOptions};
    use polcmp_flatten::Flattener;
    use serde_json::json;

    fn report() -> ComparisonReport {
        let flattener = Flattener::default();
        let doc = |name: &str, value: &str| {
            flattener
                .flatten_json(&json!({
                    "displayName": name,
                    "settingsDelta": [
                        { "definitionId": "vendor_x", "value": value },
                        { "definitionId": "vendor_same", "value": 1 }
                    ]
                }))
                .unwrap()
        };
        compare(&doc("Left", "on"), &doc("Right", "off"), &CompareOptions::default())
    }

    #[test]
    fn file_name_uses_day_first_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 17, 5, 2).unwrap();
        assert_eq!(report_file_name(now), "PolicyCompare_09032024170502.json");
    }

    #[test]
    fn writes_report_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let path = write_report(&report(), &target, now).unwrap();
        assert_eq!(path, target.join("PolicyCompare_02012024030405.json"));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["headers"], json!(["Setting", "Left", "Right", "Status"]));
        assert_eq!(written["summary"]["conflicts"], json!(1));
        assert_eq!(written["summary"]["matches"], json!(1));
        assert_eq!(written["rows"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn same_second_reports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let first = write_report(&report(), dir.path(), now).unwrap();
        let second = write_report(&report(), dir.path(), now).unwrap();
        let third = write_report(&report(), dir.path(), now).unwrap();

        assert_eq!(first, dir.path().join("PolicyCompare_02012024030405.json"));
        assert_eq!(second, dir.path().join("PolicyCompare_02012024030405_1.json"));
        assert_eq!(third, dir.path().join("PolicyCompare_02012024030405_2.json"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn existing_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let taken = dir.path().join(report_file_name(now));
        fs::write(&taken, "keep me").unwrap();

        let path = write_report(&report(), dir.path(), now).unwrap();
        assert_ne!(path, taken);
        assert_eq!(fs::read_to_string(&taken).unwrap(), "keep me");
    }

    #[test]
    fn table_lists_rows_and_summary() {
        colored::control::set_override(false);
        let table = render_table(&report(), false);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Setting"));
        assert!(lines[0].contains("Left"));
        assert!(lines.iter().any(|l| l.starts_with("x ") && l.ends_with("CONFLICT")));
        assert!(lines.iter().any(|l| l.starts_with("same") && l.ends_with("MATCH")));
        assert!(table.contains("1 match, 0 diff, 1 conflict (2 settings compared)"));
    }

    #[test]
    fn table_can_hide_matches() {
        colored::control::set_override(false);
        let table = render_table(&report(), true);
        assert!(table.contains("CONFLICT"));
        assert!(!table.lines().any(|l| l.starts_with("same")));
        assert!(!table.lines().any(|l| l.starts_with("displayName")));
    }
}
