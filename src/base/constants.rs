//! Domain constants for Synesis projects.

/// Project file (entry point of a compilation)
pub const PROJECT_EXTENSION: &str = "synp";
/// Template file (field specifications)
pub const TEMPLATE_EXTENSION: &str = "synt";
/// Annotation file (SOURCE / ITEM blocks)
pub const ANNOTATION_EXTENSION: &str = "syn";
/// Ontology file (ONTOLOGY blocks)
pub const ONTOLOGY_EXTENSION: &str = "syno";
/// Bibliography file
pub const BIBLIOGRAPHY_EXTENSION: &str = "bib";

/// Every extension that takes part in a compilation.
pub const PROJECT_FILE_EXTENSIONS: &[&str] = &[
    PROJECT_EXTENSION,
    TEMPLATE_EXTENSION,
    ANNOTATION_EXTENSION,
    ONTOLOGY_EXTENSION,
    BIBLIOGRAPHY_EXTENSION,
];

/// Leading character of a bibliographic reference (`@smith2019`).
pub const REFERENCE_PREFIX: char = '@';

/// Separates a relation-type qualifier from the chain body (`CAUSAL::a-causes-b`).
pub const QUALIFIER_SEPARATOR: &str = "::";

/// Separates concepts and relations inside a chain (`a-causes-b`).
pub const CHAIN_SEPARATOR: char = '-';

/// Block keywords of the annotation language. Never renameable.
pub const KEYWORDS: &[&str] = &[
    "PROJECT", "TEMPLATE", "SOURCE", "ITEM", "ONTOLOGY", "END", "INCLUDE", "FIELD", "BIBLIOGRAPHY",
    "ANNOTATIONS", "METADATA",
];
