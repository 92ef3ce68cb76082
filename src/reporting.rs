// Reporting and output for csrfprobe
// Findings are (phase, target, result) rows exported as CSV or Markdown

use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
fn escape_csv_field(field: &str) -> String {
    let needs_escaping = matches!(field.chars().next(), Some('=' | '+' | '-' | '@' | '\t'));

    if needs_escaping {
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn report_path(dir: &Path, extension: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("csrfprobe_report_{}.{}", timestamp, extension))
}

pub fn export_csv(results: &[(String, String, String)], dir: &Path) -> Result<PathBuf, std::io::Error> {
    let path = report_path(dir, "csv");
    let mut file = File::create(&path)?;

    writeln!(file, "Phase,Target,Result")?;
    for (phase, target, result) in results {
        writeln!(
            file,
            "{},{},{}",
            escape_csv_field(phase),
            escape_csv_field(target),
            escape_csv_field(result)
        )?;
    }

    Ok(path)
}

pub fn export_markdown(results: &[(String, String, String)], dir: &Path) -> Result<PathBuf, std::io::Error> {
    let path = report_path(dir, "md");
    let mut file = File::create(&path)?;

    writeln!(file, "# csrfprobe Report\n")?;
    for (phase, target, result) in results {
        writeln!(file, "- **{}** {}: {}", phase, target, result)?;
    }

    Ok(path)
}
