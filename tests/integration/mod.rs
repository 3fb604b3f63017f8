// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use sentence_follower::dom::Document;
use sentence_follower::highlight::{LineLayout, Point, PointerEvent, HIGHLIGHT_CLASS};

/// Test fixture helper for creating temporary directories with text and HTML inputs
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create a file with given content, creating parent directories as needed
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Run the CLI with the given arguments
    pub fn run_cli(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_sentence-follower"))
            .args(args)
            .current_dir(&self.root_path)
            .output()
            .expect("Failed to run sentence-follower")
    }
}

/// Pointer event at a layout point, targeting the element under it
pub fn pointer_at(doc: &Document, x: f64, y: f64) -> PointerEvent {
    let point = Point::new(x, y);
    let target = LineLayout
        .element_from_point(doc, point)
        .expect("Nothing under the pointer");
    PointerEvent { point, target }
}

/// Text of every highlight marker in document order
pub fn highlighted_text(doc: &Document) -> Vec<String> {
    doc.elements_with_class(HIGHLIGHT_CLASS)
        .into_iter()
        .map(|marker| doc.text_content(marker))
        .collect()
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\nActual:\n{}",
            context,
            expected_lines.len(),
            actual_lines.len(),
            actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
