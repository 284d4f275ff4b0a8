use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::aggregator::NO_LICENSE_DISPLAY;
use crate::models::{LicenseBucket, Report};

/// Render the report: one section per license bucket, then a summary table.
pub fn render(report: &Report, root: &Path, verbose: bool, quiet: bool) -> Result<()> {
    if quiet {
        println!(
            "Files: {}  Licenses: {}  Undetected: {}",
            report.total_files,
            report.buckets.iter().filter(|b| !b.id.is_empty() && b.count > 0).count(),
            undetected_count(report).to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "license-report".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}", root.display());
    println!(" Total dependent source files: {}\n", report.total_files);

    print!("{}", bucket_sections(report, verbose));
    println!();

    render_table(report);
    Ok(())
}

/// One section per bucket: identifier header, indented files, count.
/// Buckets without files are only listed when `verbose` is set.
fn bucket_sections(report: &Report, verbose: bool) -> String {
    report
        .buckets
        .iter()
        .filter(|b| verbose || b.count > 0)
        .map(bucket_section)
        .collect()
}

fn bucket_section(bucket: &LicenseBucket) -> String {
    let header = format!("SPDX-License-Identifier: {}", bucket.display_name);
    let header = if bucket.id.is_empty() {
        header.yellow().bold()
    } else {
        header.bold()
    };

    let mut out = format!("{header}\n");
    for file in &bucket.files {
        out.push_str(&format!("    {}\n", file.display()));
    }
    out.push_str(&format!("        count: {}\n", bucket.count));
    out
}

fn render_table(report: &Report) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Files").add_attribute(Attribute::Bold),
        ]);

    for bucket in &report.buckets {
        let color = if bucket.id.is_empty() {
            Color::Yellow
        } else {
            Color::Green
        };
        table.add_row(vec![
            Cell::new(&bucket.display_name).fg(color),
            Cell::new(bucket.count).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);

    let undetected = undetected_count(report);
    if undetected > 0 {
        println!(
            " {} {} file(s) reported as {}\n",
            "[WARN]".yellow().bold(),
            undetected,
            NO_LICENSE_DISPLAY
        );
    }
}

fn undetected_count(report: &Report) -> usize {
    report.bucket("").map(|b| b.count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::LicenseAssignment;

    fn report() -> Report {
        let mut assignment = LicenseAssignment::new();
        assignment.record("MIT", Path::new("/w/src/a.c"));
        assignment.record("MIT", Path::new("/w/src/b.c"));
        assignment.record("Apache-2.0", Path::new("/w/lib/c.c"));
        assignment.finalize()
    }

    #[test]
    fn test_sections_list_files_and_counts() {
        let out = bucket_sections(&report(), false);
        assert!(out.contains("SPDX-License-Identifier: MIT"));
        assert!(out.contains("    /w/src/a.c\n"));
        assert!(out.contains("    /w/src/b.c\n"));
        assert!(out.contains("        count: 2\n"));
        assert!(out.contains("SPDX-License-Identifier: Apache-2.0"));
        assert!(out.contains("    /w/lib/c.c\n"));
        assert!(out.contains("        count: 1\n"));
    }

    #[test]
    fn test_empty_buckets_only_when_verbose() {
        let report = report();
        assert!(!bucket_sections(&report, false).contains(NO_LICENSE_DISPLAY));

        let verbose = bucket_sections(&report, true);
        assert!(verbose.contains(&format!("SPDX-License-Identifier: {NO_LICENSE_DISPLAY}")));
        assert!(verbose.contains("        count: 0\n"));
    }

    #[test]
    fn test_undetected_files_are_listed() {
        let mut assignment = LicenseAssignment::new();
        assignment.record_undetected(Path::new("/w/empty.c"));
        let out = bucket_sections(&assignment.finalize(), false);
        assert!(out.contains(NO_LICENSE_DISPLAY));
        assert!(out.contains("    /w/empty.c\n"));
    }
}
