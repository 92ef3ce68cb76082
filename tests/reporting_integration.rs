use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("csrfprobe-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn reporting_exports_create_files() {
    let results = vec![(
        "bypass REMOVE".to_string(),
        "https://shop.test/account/email".to_string(),
        "BYPASSED".to_string(),
    )];
    let dir = scratch_dir("exports");

    let csv_path = csrfprobe::reporting::export_csv(&results, &dir).expect("CSV export should succeed");
    let md_path = csrfprobe::reporting::export_markdown(&results, &dir).expect("Markdown export should succeed");

    assert!(csv_path.exists(), "CSV file should exist: {}", csv_path.display());
    assert!(md_path.exists(), "Markdown file should exist: {}", md_path.display());

    let csv_name = csv_path.file_name().unwrap().to_string_lossy().to_string();
    let md_name = md_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(csv_name.starts_with("csrfprobe_report_"));
    assert!(csv_name.ends_with(".csv"));
    assert!(md_name.starts_with("csrfprobe_report_"));
    assert!(md_name.ends_with(".md"));

    let markdown = fs::read_to_string(&md_path).unwrap();
    assert!(markdown.contains("- **bypass REMOVE** https://shop.test/account/email: BYPASSED"));

    let _ = fs::remove_dir_all(&dir);
}
