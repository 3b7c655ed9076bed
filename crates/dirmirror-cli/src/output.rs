use dirmirror_core::domain::action::ActionKind;
use dirmirror_core::domain::report::PassReport;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn format_duration(duration_ms: u64) -> String {
    if duration_ms >= 1000 {
        format!("{:.1}s", duration_ms as f64 / 1000.0)
    } else {
        format!("{}ms", duration_ms)
    }
}

fn count(report: &PassReport, kind: ActionKind) -> usize {
    report.actions.iter().filter(|a| a.kind() == kind).count()
}

/// JSON document describing one pass
///
/// Paths are rendered lossily; file names need not be UTF-8.
pub fn report_json(report: &PassReport) -> serde_json::Value {
    let actions: Vec<serde_json::Value> = report
        .actions
        .iter()
        .map(|a| serde_json::json!({"kind": a.kind(), "path": a.path().to_string_lossy()}))
        .collect();
    let missing: Vec<String> = report
        .missing_sources
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    serde_json::json!({
        "created": report.created(),
        "modified": report.modified(),
        "removed": report.removed(),
        "missing_sources": missing,
        "duration_ms": report.duration_ms,
        "actions": actions,
    })
}

/// Prints the summary of a single pass
pub fn print_report(formatter: &dyn OutputFormatter, format: OutputFormat, report: &PassReport) {
    if format == OutputFormat::Json {
        formatter.print_json(&report_json(report));
        return;
    }

    if report.is_noop() && report.missing_sources.is_empty() {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!(
            "Sync completed in {}",
            format_duration(report.duration_ms)
        ));
    }

    let created = report.created();
    if created > 0 {
        formatter.info(&format!("Created:  {} file{}", created, plural(created)));
    }
    let folders = count(report, ActionKind::FolderCreated);
    if folders > 0 {
        formatter.info(&format!("Folders:  {} created", folders));
    }
    let bulk = count(report, ActionKind::BulkCopied);
    if bulk > 0 {
        formatter.info(&format!("Copied:   {} subtree{}", bulk, plural(bulk)));
    }
    let modified = report.modified();
    if modified > 0 {
        formatter.info(&format!("Modified: {} file{}", modified, plural(modified)));
    }
    let removed = report.removed();
    if removed > 0 {
        formatter.info(&format!("Removed:  {} item{}", removed, plural(removed)));
    }

    for missing in &report.missing_sources {
        formatter.warn(&format!("Source folder does not exist: {}", missing.display()));
    }
}
