//! Compilations loaded from disk generate the same registry as in-memory ones.

use optreg_conformance::{run_single, CompilationBuilder};
use optreg_symbols::{Compilation, SymbolQuery};
use tempfile::TempDir;

#[test]
fn serialised_compilation_generates_identically() {
    let c = CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .widget("Updated", 2, "updated")
        .build();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("symbols.json");
    std::fs::write(&path, serde_json::to_string_pretty(&c).unwrap()).unwrap();

    let loaded = Compilation::load(&path).unwrap();
    assert_eq!(loaded.types().len(), c.types().len());
    assert_eq!(loaded.target_framework(), Some("net8.0"));

    let from_disk = run_single(&loaded);
    let in_memory = run_single(&c);
    assert_eq!(from_disk.single_text(), in_memory.single_text());
    assert_eq!(
        from_disk.artifact.units[0].content_hash,
        in_memory.artifact.units[0].content_hash
    );
}

#[test]
fn malformed_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("symbols.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Compilation::load(&path).is_err());
}
