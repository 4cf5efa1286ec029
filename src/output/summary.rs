use super::stats::{AnalystCounters, RunReport};
use std::fmt::Write;

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Renders the end-of-run summary as plain text
pub fn format_summary(report: &RunReport) -> String {
    let counters: &AnalystCounters = &report.counters;
    let total = counters.websites_total;
    let mut out = String::new();

    let _ = writeln!(out, "=== Contact Sweep Summary ===\n");

    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  Started: {}", report.started_at.to_rfc3339());
    let _ = writeln!(out, "  Finished: {}", report.finished_at.to_rfc3339());
    let _ = writeln!(out, "  Duration: {}s", report.duration_seconds());
    let _ = writeln!(out);

    let _ = writeln!(out, "Websites:");
    let _ = writeln!(out, "  Total: {}", total);
    for (label, count) in [
        ("Crawled", counters.websites_crawled),
        ("Unreachable", counters.websites_unreachable),
        ("Failed", counters.websites_failed),
        ("Cancelled", counters.websites_cancelled),
    ] {
        let _ = writeln!(
            out,
            "  {}: {} ({:.1}%)",
            label,
            count,
            percentage(count, total)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Findings:");
    let _ = writeln!(out, "  Phone numbers: {}", counters.phones_found);
    let _ = writeln!(out, "  Physical addresses: {}", counters.addresses_found);
    let _ = writeln!(out, "  Social media links: {}", counters.social_links_found);
    let _ = writeln!(out);

    if report.was_cancelled() {
        let _ = writeln!(out, "Run was interrupted; results are partial.");
    }

    let _ = write!(
        out,
        "Crawl Rate: {:.1}% ({} / {} websites crawled)",
        counters.crawl_rate(),
        counters.websites_crawled,
        total
    );
    out
}

/// Prints the end-of-run summary to stdout
pub fn print_summary(report: &RunReport) {
    println!("{}", format_summary(report));
}
