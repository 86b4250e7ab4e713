//! Fixture tests against expected output
//!
//! Each `tests/fixtures/NAME.EXT` input is fixed and compared line by line
//! with `tests/fixtures/NAME.expected.EXT`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;

use tmplfix::process::format_file;
use tmplfix::{Config, Rule};

fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(file)
}

/// Run tmplfix on a fixture and compare with its expected output
fn check_fixture(input_file: &str, expected_file: &str, config: &Config) {
    let input_path = fixture_path(input_file);
    let expected_path = fixture_path(expected_file);

    let input = fs::read_to_string(&input_path)
        .unwrap_or_else(|e| panic!("Failed to read input file {}: {e}", input_path.display()));
    let expected = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read expected file {}: {e}",
            expected_path.display()
        )
    });

    let reader = BufReader::new(Cursor::new(input.as_bytes()));
    let mut output = Vec::new();
    format_file(reader, &mut output, config, input_file)
        .unwrap_or_else(|e| panic!("tmplfix failed on {input_file}: {e}"));
    let result = String::from_utf8(output)
        .unwrap_or_else(|e| panic!("Invalid UTF-8 in output for {input_file}: {e}"));

    let result_lines: Vec<&str> = result.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    let differences: Vec<(usize, &str, &str)> = expected_lines
        .iter()
        .zip(result_lines.iter())
        .enumerate()
        .filter(|(_, (expected, got))| expected != got)
        .map(|(i, (expected, got))| (i + 1, *expected, *got))
        .collect();

    if !differences.is_empty() {
        eprintln!("\n=== Differences in {input_file} ===");
        for (line_num, expected, got) in differences.iter().take(10) {
            eprintln!("\nLine {line_num}:");
            eprintln!("  expected: {expected:?}");
            eprintln!("  got:      {got:?}");
        }
        panic!("{} differences found", differences.len());
    }
    assert_eq!(
        result_lines.len(),
        expected_lines.len(),
        "Line count mismatch for {input_file}"
    );
    assert_eq!(result, expected, "Line terminators differ for {input_file}");
}

#[test]
fn test_fixture_page() {
    check_fixture("page.twig", "page.expected.twig", &Config::default());
}

#[test]
fn test_fixture_multi_line_tags() {
    check_fixture(
        "multiline.html",
        "multiline.expected.html",
        &Config::default(),
    );
}

#[test]
fn test_fixtures_are_stable() {
    // Expected outputs are already fixed
    check_fixture(
        "page.expected.twig",
        "page.expected.twig",
        &Config::default(),
    );
    check_fixture(
        "multiline.expected.html",
        "multiline.expected.html",
        &Config::default(),
    );
}

#[test]
fn test_fixture_without_indent_only_touches_blanks() {
    let mut config = Config::default();
    config.set_rule(Rule::Indent, false);

    let input = fs::read_to_string(fixture_path("page.twig")).unwrap();
    let result = tmplfix::format_str(&input, &config);

    let leading = |line: &str| line.len() - line.trim_start().len();
    for (before, after) in input.lines().zip(result.lines()) {
        if before.trim().is_empty() {
            assert_eq!(after, "");
        } else {
            assert_eq!(leading(before), leading(after), "{before:?} -> {after:?}");
        }
    }
    assert!(result.contains("{{ title|upper }}"));
    assert!(result.contains("<div class=\"container\">\n"));
}
