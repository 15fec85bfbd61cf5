// Trellis golden-file runner.
// Discovers every .trellis snippet in tests/scripts/, runs it through the engine,
// and compares the HTML (or the one-line error for failing snippets) with the
// sibling .html file. Reports pass/fail with color and integrates with cargo test.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

use trellis::{Executor, HtmlRenderer};

fn find_test_scripts(dir: &str) -> Vec<(PathBuf, PathBuf)> {
    let mut tests = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "trellis") {
            let expected = path.with_extension("html");
            if expected.exists() {
                tests.push((path.to_path_buf(), expected));
            }
        }
    }
    tests
}

fn read_file_trimmed(path: &Path) -> io::Result<String> {
    Ok(fs::read_to_string(path)?
        .replace("\r\n", "\n")
        .trim()
        .to_string())
}

#[test]
fn golden_scripts() {
    let scripts = find_test_scripts("tests/scripts");
    assert!(
        !scripts.is_empty(),
        "No .trellis scripts found in tests/scripts/"
    );

    let executor = Executor::new();
    let renderer = HtmlRenderer::new();
    let mut failed = false;
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for (script, expected) in scripts {
        let script_name = script.file_name().unwrap().to_string_lossy();
        let source = read_file_trimmed(&script).expect("Failed to read script");
        let expected_output = read_file_trimmed(&expected).expect("Failed to read expected output");

        let result = executor.run(&source, &renderer);
        // Failing snippets are compared by their user-facing message.
        let actual_output = result
            .html
            .or(result.error)
            .unwrap_or_default()
            .trim()
            .to_string();

        if actual_output == expected_output {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
            let _ = writeln!(stdout, "PASS: {script_name}");
        } else {
            failed = true;
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
            let _ = writeln!(stdout, "FAIL: {script_name}");
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(false));
            let _ = writeln!(stdout, "  Expected: {expected_output:?}");
            let _ = writeln!(stdout, "  Actual:   {actual_output:?}");
        }
        let _ = stdout.reset();
    }

    if failed {
        panic!("One or more golden scripts failed. See output above.");
    }
}
