use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use assembler::{
    AssemblerFailure, FileSource, OutputOptions, SymbolName, assemble_file, assemble_source,
};

fn get_test_input_file_name(relative_to_manifest: &str) -> PathBuf {
    let mut location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    location.push(relative_to_manifest);
    if location.exists() {
        location
    } else {
        panic!(
            "Cannot find input {relative_to_manifest}: {} does not exist",
            location.display()
        );
    }
}

fn get_temp_output_file_name() -> tempfile::TempPath {
    tempfile::Builder::new()
        .suffix(".rom")
        .tempfile()
        .expect("should be able to create a temporary file")
        .into_temp_path()
}

fn files_are_identical(expected: &Path, got: &Path) -> Result<(), String> {
    fn must_read(name: &Path) -> String {
        fs::read_to_string(name)
            .unwrap_or_else(|e| panic!("should be able to read test file {}: {e}", name.display()))
    }

    let expected_text = must_read(expected);
    let got_text = must_read(got);
    if expected_text.len() != got_text.len() {
        return Err(format!(
            "wrong file length: {} is {} bytes but {} is {} bytes",
            expected.display(),
            expected_text.len(),
            got.display(),
            got_text.len()
        ));
    }
    for (position, (expected_cell, got_cell)) in
        expected_text.split(',').zip(got_text.split(',')).enumerate()
    {
        if expected_cell != got_cell {
            return Err(format!(
                "difference at cell {position}: expected {expected_cell} but got {got_cell}"
            ));
        }
    }
    Ok(())
}

fn assembler_golden_output_test(
    input_relative_path: &str,
    golden_output_relative_path: &str,
) -> Result<(), String> {
    let input = get_test_input_file_name(input_relative_path);
    let golden = get_test_input_file_name(golden_output_relative_path);
    let actual_output = get_temp_output_file_name();

    match assemble_file(
        input.as_os_str(),
        &actual_output,
        OutputOptions::default(),
    ) {
        Ok(()) => files_are_identical(&golden, &actual_output).map_err(|e| {
            format!(
                "{} and {} are not identical: {e}",
                golden.display(),
                actual_output.display()
            )
        }),
        Err(e) => Err(format!("failed to assemble {input_relative_path}: {e}")),
    }
}

#[test]
fn golden_output_assembling_hello_program() {
    assembler_golden_output_test("testdata/hello/main.asm", "testdata/hello/hello.rom")
        .expect("actual and golden outputs should have been identical");
}

#[test]
fn hello_program_symbols_and_warnings() {
    let input = get_test_input_file_name("testdata/hello/main.asm");
    let assembled =
        assemble_source(&FileSource, &input).expect("hello program should assemble");
    assert!(assembled.warnings().is_empty());
    let value = |name: &str| assembled.symbols().get(&SymbolName::from(name));
    assert_eq!(value("CLEAR"), Some(0));
    assert_eq!(value("@GREET"), Some(5));
    assert_eq!(value("GREET"), None);
    assert_eq!(value("COLOUR"), Some(7));
    assert!(assembled.cells().iter().all(|cell| cell.is_resolved()));
    let listing = assembled.listing();
    assert!(listing.contains("@GREET"));
    assert!(listing.lines().any(|line| line.trim_end().ends_with("HALT")));
}

#[test]
fn missing_input_is_reported() {
    let output = get_temp_output_file_name();
    match assemble_file(
        OsStr::new("testdata/no-such-file.asm"),
        &output,
        OutputOptions::default(),
    ) {
        Err(AssemblerFailure::Io(_)) => (),
        other => panic!("expected an I/O failure, got {other:?}"),
    }
}
