use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use base::prelude::DISPLAY_MEMORY_BASE;

use super::super::encoder::Cell;
use super::super::parser::parse_source;
use super::super::source::SourceLoader;
use super::super::state::AssemblyContext;
use super::super::symbol::SymbolName;
use super::super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget, Warning};
use super::{AssembledProgram, assemble_source, split_regions};

/// Serves source files from memory.
struct MemorySource {
    files: HashMap<PathBuf, &'static str>,
}

impl MemorySource {
    fn new(files: &[(&str, &'static str)]) -> MemorySource {
        MemorySource {
            files: files
                .iter()
                .map(|(name, body)| (PathBuf::from(name), *body))
                .collect(),
        }
    }
}

impl SourceLoader for MemorySource {
    fn load(&self, path: &Path) -> Result<Vec<String>, AssemblerFailure> {
        match self.files.get(path) {
            Some(body) => Ok(body.lines().map(String::from).collect()),
            None => Err(AssemblerFailure::Io(IoFailed {
                action: IoAction::Read,
                target: IoTarget::File(path.to_path_buf()),
                error: IoError::from(ErrorKind::NotFound),
            })),
        }
    }
}

fn assemble_files(files: &[(&str, &'static str)]) -> Result<AssembledProgram, AssemblerFailure> {
    let (main, _) = files.first().expect("test should supply a main file");
    assemble_source(&MemorySource::new(files), Path::new(main))
}

fn assemble_ok(files: &[(&str, &'static str)]) -> AssembledProgram {
    match assemble_files(files) {
        Ok(assembled) => assembled,
        Err(e) => panic!("test program should assemble: {e}"),
    }
}

fn output_of(files: &[(&str, &'static str)]) -> String {
    assemble_ok(files).program().to_string()
}

fn symbol_value(assembled: &AssembledProgram, name: &str) -> Option<i64> {
    assembled.symbols().get(&SymbolName::from(name))
}

#[test]
fn test_source_order_is_kept() {
    assert_eq!(
        output_of(&[("main.asm", "PUSH #1\nADD\nPOP R2\nHALT\n")]),
        "0x0B,1,0x09,0x0C,2,0x00"
    );
}

#[test]
fn test_forward_reference() {
    assert_eq!(
        output_of(&[("main.asm", "GOTO DONE\nPUSH #1\nLABEL DONE\nHALT\n")]),
        "0xDE,4,0x0B,1,0x00"
    );
}

#[test]
fn test_entry_block_is_placed_last() {
    const ENTRY_FIRST: &str = concat!(
        "#START\n",
        "CALL @PRINT\n",
        "CALL PRINT\n",
        "HALT\n",
        "#END\n",
        "LABEL PRINT\n",
        "LABEL @PRINT\n",
        "PUSH #7\n",
        "RET\n",
    );
    const ENTRY_LAST: &str = concat!(
        "LABEL PRINT\n",
        "LABEL @PRINT\n",
        "PUSH #7\n",
        "RET\n",
        "#START\n",
        "CALL @PRINT\n",
        "CALL PRINT\n",
        "HALT\n",
        "#END\n",
    );
    const EXPECTED: &str = "0x0B,7,0xFF,0x11,0,0xDE,0x11,0,0xDE,0x00";
    assert_eq!(output_of(&[("main.asm", ENTRY_FIRST)]), EXPECTED);
    assert_eq!(output_of(&[("main.asm", ENTRY_LAST)]), EXPECTED);
}

#[test]
fn test_entry_block_labels_are_relocated() {
    let assembled = assemble_ok(&[("main.asm", "#START\nLABEL MAIN\nGOTO MAIN\n#END\nHALT\n")]);
    assert_eq!(symbol_value(&assembled, "MAIN"), Some(1));
    assert_eq!(assembled.program().to_string(), "0x00,0xDE,1");
}

#[test]
fn test_entry_block_without_end_runs_to_end_of_file() {
    let assembled = assemble_ok(&[("main.asm", "ADD\n#START\nHALT\nLABEL AFTER\n")]);
    assert_eq!(assembled.program().to_string(), "0x09,0x00");
    assert_eq!(symbol_value(&assembled, "AFTER"), Some(2));
    assert!(assembled.warnings().is_empty());
}

#[test]
fn test_import_offsets_labels_and_shares_variables() {
    let assembled = assemble_ok(&[
        (
            "main.asm",
            "PUSH #1\nIMPORT \"lib.asm\"\nLOAD R1 SIZE\nGOTO SUBR\n",
        ),
        ("lib.asm", "VAR SIZE #32\nLABEL SUBR\nRET\n"),
    ]);
    assert_eq!(symbol_value(&assembled, "SUBR"), Some(2));
    assert_eq!(symbol_value(&assembled, "SIZE"), Some(32));
    assert_eq!(assembled.program().to_string(), "0x0B,1,0xFF,0x01,32,0xDE,2");
}

#[test]
fn test_nested_imports_use_absolute_addresses() {
    assert_eq!(
        output_of(&[
            ("progs/main.asm", "PUSH #0\nIMPORT \"lib/a.asm\"\nGOTO B\n"),
            ("progs/lib/a.asm", "ADD\nIMPORT \"b.asm\"\n"),
            ("progs/lib/b.asm", "LABEL B\nRET\n"),
        ]),
        "0x0B,0,0x09,0xFF,0xDE,3"
    );
}

#[test]
fn test_imported_entry_block_stays_with_its_file() {
    assert_eq!(
        output_of(&[
            ("main.asm", "IMPORT \"lib.asm\"\nRET\n"),
            ("lib.asm", "#START\nHALT\n#END\nLABEL X\nADD\n"),
        ]),
        "0x09,0x00,0xFF"
    );
}

#[test]
fn test_display_cursor_is_shared_with_imports() {
    let assembled = assemble_ok(&[
        ("main.asm", "WCHR A #1 #2 #3 #4\nIMPORT \"lib.asm\"\nWCHR C #1 #2 #3 #4\n"),
        ("lib.asm", "WCHR B #1 #2 #3 #4\n"),
    ]);
    let cells = assembled.cells();
    assert_eq!(cells.len(), 75);
    // The address operand of the first store of each record.
    assert_eq!(cells[3], Cell::Value(DISPLAY_MEMORY_BASE));
    assert_eq!(cells[28], Cell::Value(DISPLAY_MEMORY_BASE + 5));
    assert_eq!(cells[53], Cell::Value(DISPLAY_MEMORY_BASE + 10));
}

#[test]
fn test_display_records_follow_source_order() {
    // The entry block's code comes last, but its record comes first.
    let assembled = assemble_ok(&[(
        "main.asm",
        "#START\nWCHR A #1 #2 #3 #4\n#END\nWCHR B #1 #2 #3 #4\n",
    )]);
    let cells = assembled.cells();
    assert_eq!(cells.len(), 50);
    assert_eq!(cells[1].to_string(), "0x02");
    assert_eq!(cells[3], Cell::Value(DISPLAY_MEMORY_BASE + 5));
    assert_eq!(cells[26].to_string(), "0x01");
    assert_eq!(cells[28], Cell::Value(DISPLAY_MEMORY_BASE));
}

#[test]
fn test_imported_records_follow_source_order() {
    let assembled = assemble_ok(&[
        (
            "main.asm",
            "#START\nWCHR A #1 #2 #3 #4\n#END\nIMPORT \"lib.asm\"\nWCHR C #1 #2 #3 #4\n",
        ),
        ("lib.asm", "IMPORT \"font.asm\"\n"),
        ("font.asm", "WCHR B #1 #2 #3 #4\n"),
    ]);
    let cells = assembled.cells();
    assert_eq!(cells.len(), 75);
    // Code order is B, C, A.
    assert_eq!(cells[3], Cell::Value(DISPLAY_MEMORY_BASE + 5));
    assert_eq!(cells[28], Cell::Value(DISPLAY_MEMORY_BASE + 10));
    assert_eq!(cells[53], Cell::Value(DISPLAY_MEMORY_BASE));
}

#[test]
fn test_indirect_names_keep_their_at_sign() {
    assert_eq!(output_of(&[("main.asm", "VAR @PTR #7\nPOT @PTR\n")]), "0x11,7");
    assert_eq!(
        output_of(&[("main.asm", "LABEL @LOOP\nPUSH @LOOP\nGOTO @LOOP\n")]),
        "0x0B,0,0xDE,0"
    );
    // The plain name is a different symbol.
    match assemble_files(&[("main.asm", "VAR PTR #7\nPOT @PTR\n")]) {
        Err(AssemblerFailure::UnboundSymbol { name, .. }) => {
            assert_eq!(name, SymbolName::from("@PTR"));
        }
        other => panic!("expected an unbound symbol failure, got {other:?}"),
    }
}

#[test]
fn test_variable_named_like_a_register() {
    assert_eq!(output_of(&[("main.asm", "VAR R1 #5\nPUSH R1\n")]), "0x0B,5");
    assert_eq!(output_of(&[("main.asm", "VAR #3 #9\nPOT #3\nPOP R1\n")]), "0x11,9,0x0C,1");
}

#[test]
fn test_repeated_import_rebinds_labels() {
    let assembled = assemble_ok(&[
        (
            "main.asm",
            "IMPORT \"lib.asm\"\nIMPORT \"lib.asm\"\nGOTO L\n",
        ),
        ("lib.asm", "LABEL L\nRET\n"),
    ]);
    assert_eq!(assembled.program().to_string(), "0xFF,0xFF,0xDE,1");
    assert!(matches!(
        assembled.warnings(),
        [Warning::Redefinition {
            previous: 0,
            value: 1,
            ..
        }]
    ));
}

#[test]
fn test_import_cycle_is_rejected() {
    let result = assemble_files(&[
        ("a.asm", "IMPORT \"b.asm\"\n"),
        ("b.asm", "ADD\nIMPORT \"./a.asm\"\n"),
    ]);
    match result {
        Err(AssemblerFailure::ImportCycle { file, location }) => {
            assert_eq!(file, PathBuf::from("a.asm"));
            assert_eq!(location.to_string(), "b.asm:2");
        }
        other => panic!("expected an import cycle, got {other:?}"),
    }
}

#[test]
fn test_self_import_is_rejected() {
    assert!(matches!(
        assemble_files(&[("main.asm", "IMPORT \"main.asm\"\n")]),
        Err(AssemblerFailure::ImportCycle { .. })
    ));
}

#[test]
fn test_missing_import_is_an_io_failure() {
    match assemble_files(&[("main.asm", "IMPORT \"nowhere.asm\"\n")]) {
        Err(AssemblerFailure::Io(IoFailed {
            action: IoAction::Read,
            target: IoTarget::File(name),
            ..
        })) => {
            assert_eq!(name, PathBuf::from("nowhere.asm"));
        }
        other => panic!("expected a read failure, got {other:?}"),
    }
}

#[test]
fn test_unbound_reference_fails() {
    match assemble_files(&[("main.asm", "GOTO NOWHERE\n")]) {
        Err(AssemblerFailure::UnboundSymbol { name, location }) => {
            assert_eq!(name, SymbolName::from("NOWHERE"));
            assert_eq!(location, None);
        }
        other => panic!("expected an unbound symbol failure, got {other:?}"),
    }
}

#[test]
fn test_warnings_are_collected() {
    let assembled = assemble_ok(&[("main.asm", "#END\nFROB\nVAR X #1\nVAR X #2\nHALT\n")]);
    assert_eq!(assembled.program().to_string(), "0x00");
    match assembled.warnings() {
        [Warning::UnmatchedEntryMarker { marker, .. }, Warning::UnknownMnemonic { mnemonic, .. }, Warning::Redefinition { name, .. }] =>
        {
            assert_eq!(marker, "#END");
            assert_eq!(mnemonic, "FROB");
            assert_eq!(name, &SymbolName::from("X"));
        }
        other => panic!("unexpected warnings {other:?}"),
    }
}

#[test]
fn test_nested_start_is_ignored() {
    let mut ctx = AssemblyContext::default();
    let statements = parse_source(
        Path::new("main.asm"),
        &["#START", "ADD", "#START", "SUB", "#END", "HALT"].map(String::from),
    )
    .expect("source should parse");
    let regions = split_regions(Path::new("main.asm"), statements, &mut ctx);
    assert_eq!(regions.entry.len(), 2);
    assert_eq!(regions.preamble.len(), 1);
    assert!(matches!(
        ctx.warnings.as_slice(),
        [Warning::UnmatchedEntryMarker { marker, .. }] if marker == "#START"
    ));
}

#[test]
fn test_assembly_is_deterministic() {
    const FILES: &[(&str, &str)] = &[
        (
            "main.asm",
            "VAR Z #26\nVAR A #1\n#START\nCALL F\n#END\nLABEL F\nPUSH Z\nPUSH A\nRET\n",
        ),
    ];
    let first = assemble_ok(FILES);
    let second = assemble_ok(FILES);
    assert_eq!(first, second);
    assert_eq!(first.listing(), second.listing());
}
