//! On-disk scenario workspace plus a compiler that describes it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use synesis::Location;
use synesis::ide::{WorkspaceEdit, apply_edits};
use synesis::project::{
    BibEntry, CompileError, CompiledProject, Compiler, FieldOccurrence, ItemRecord,
    OntologyConcept, SourceRecord,
};

pub fn project_text() -> String {
    "PROJECT demo\n    INCLUDE interviews.syn\n    INCLUDE ontology.syno\n    INCLUDE references.bib\nEND\n"
        .to_string()
}

/// ```text
///  1 SOURCE @r1
///  2     title: Entrevista r1x
///  4     ITEM
///  5         code: alpha
///  6         chain: alpha-causes-beta
/// 10 SOURCE @r3
/// 13     ITEM
/// 14         code: delta
/// ```
pub fn interviews_text(code: &str, reference: &str) -> String {
    format!(
        "SOURCE @{reference}\n    title: Entrevista r1x\n\n    ITEM\n        code: {code}\n        chain: {code}-causes-beta\n    END\nEND\n\nSOURCE @r3\n    title: Sem cadeias\n\n    ITEM\n        code: delta\n    END\nEND\n"
    )
}

pub fn bibliography_text(reference: &str) -> String {
    format!(
        "@article{{{reference},\n  title = {{Entrevista}}\n}}\n\n@book{{r3,\n  title = {{Livro}}\n}}\n"
    )
}

pub fn ontology_text(code: &str) -> String {
    format!(
        "ONTOLOGY {code}\n    topic: Causas\n    description: Primeiro conceito\nEND\n\nONTOLOGY gamma\n    topic: Causas\nEND\n"
    )
}

/// The project the external compiler would produce for the scenario files.
///
/// Locations are absolute, as a compiler reports them.
pub fn scenario_project(root: &Path, code: &str, reference: &str) -> CompiledProject {
    let at = |file: &str, line: u32, column: u32| {
        Location::new(root.join(file).to_string_lossy().to_string(), line, column)
    };

    CompiledProject::new()
        .with_name("demo")
        .with_source(
            SourceRecord::new(format!("@{reference}"))
                .with_location(at("interviews.syn", 1, 1))
                .with_field("title", "Entrevista r1x")
                .with_item(
                    ItemRecord::new()
                        .with_location(at("interviews.syn", 4, 5))
                        .with_field(FieldOccurrence::new("code", code).at(at("interviews.syn", 5, 15)))
                        .with_field(
                            FieldOccurrence::new("chain", format!("{code}-causes-beta"))
                                .at(at("interviews.syn", 6, 16)),
                        ),
                ),
        )
        .with_source(
            SourceRecord::new("@r3")
                .with_location(at("interviews.syn", 10, 1))
                .with_field("title", "Sem cadeias")
                .with_item(
                    ItemRecord::new()
                        .with_location(at("interviews.syn", 13, 5))
                        .with_field(FieldOccurrence::new("code", "delta").at(at("interviews.syn", 14, 15))),
                ),
        )
        .with_concept(
            OntologyConcept::new(code)
                .with_location(at("ontology.syno", 1, 10))
                .with_field("topic", "Causas")
                .with_field("description", "Primeiro conceito"),
        )
        .with_concept(
            OntologyConcept::new("gamma")
                .with_location(at("ontology.syno", 6, 10))
                .with_field("topic", "Causas"),
        )
        .with_bib_entry(
            BibEntry::new(reference, "article")
                .with_location(at("references.bib", 1, 1))
                .with_field("title", "Entrevista"),
        )
        .with_bib_entry(
            BibEntry::new("r3", "book")
                .with_location(at("references.bib", 5, 1))
                .with_field("title", "Livro"),
        )
}

/// Compiler for the scenario workspace. A `broken.syn` file makes it fail.
pub fn scenario_compiler() -> impl Compiler {
    |root: &Path, _cancel: &CancellationToken| -> Result<CompiledProject, CompileError> {
        let broken = root.join("broken.syn");
        if broken.exists() {
            return Err(CompileError::syntax(
                "expected END before end of file",
                Location::new(broken.to_string_lossy().to_string(), 3, 1),
            ));
        }
        if !root.join("project.synp").exists() {
            return Err(CompileError::NoProject(root.to_path_buf()));
        }
        Ok(scenario_project(root, "alpha", "r1"))
    }
}

pub struct ScenarioWorkspace {
    dir: TempDir,
}

impl ScenarioWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let workspace = Self { dir };
        workspace.write("project.synp", &project_text());
        workspace.write("interviews.syn", &interviews_text("alpha", "r1"));
        workspace.write("references.bib", &bibliography_text("r1"));
        workspace.write("ontology.syno", &ontology_text("alpha"));
        workspace.write("notes.md", "alpha r1 are not scanned here\n");
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn root_str(&self) -> String {
        self.dir.path().to_string_lossy().to_string()
    }

    pub fn write(&self, file: &str, content: &str) {
        fs::write(self.dir.path().join(file), content).unwrap();
    }

    pub fn read(&self, file: &str) -> String {
        fs::read_to_string(self.dir.path().join(file)).unwrap()
    }

    /// Write the result of applying `edit` back to disk.
    pub fn apply(&self, edit: &WorkspaceEdit) {
        for (file, edits) in &edit.changes {
            let updated = apply_edits(&self.read(file), edits);
            self.write(file, &updated);
        }
    }

    /// Every file's content, keyed by name.
    pub fn contents(&self) -> BTreeMap<String, String> {
        fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| {
                let name = entry.unwrap().file_name().to_string_lossy().to_string();
                let content = self.read(&name);
                (name, content)
            })
            .collect()
    }
}
