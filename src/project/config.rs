//! Workspace-level options shared by the index builder, the reload host and rename.

use crate::base::constants::{
    ANNOTATION_EXTENSION, BIBLIOGRAPHY_EXTENSION, ONTOLOGY_EXTENSION, PROJECT_EXTENSION,
    REFERENCE_PREFIX, TEMPLATE_EXTENSION,
};

/// Options controlling how a workspace is indexed and scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceOptions {
    /// Leading character of bibliographic references.
    pub reference_prefix: char,
    /// Files scanned for raw textual mentions during rename.
    pub annotation_extensions: Vec<String>,
    /// Files whose change invalidates the cached workspace.
    pub context_extensions: Vec<String>,
    /// Field names treated as code fields when the template is silent.
    pub code_fields: Vec<String>,
    /// Field names treated as chain fields when the template is silent.
    pub chain_fields: Vec<String>,
    /// Ontology field grouped into the topic index.
    pub topic_field: String,
    /// Directory names skipped while walking the workspace.
    pub ignored_dirs: Vec<String>,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        let extensions: Vec<String> = [
            ANNOTATION_EXTENSION,
            ONTOLOGY_EXTENSION,
            PROJECT_EXTENSION,
            TEMPLATE_EXTENSION,
            BIBLIOGRAPHY_EXTENSION,
        ]
        .iter()
        .map(|ext| ext.to_string())
        .collect();

        Self {
            reference_prefix: REFERENCE_PREFIX,
            annotation_extensions: extensions.clone(),
            context_extensions: extensions,
            code_fields: vec!["code".to_string(), "codes".to_string()],
            chain_fields: vec!["chain".to_string(), "chains".to_string()],
            topic_field: "topic".to_string(),
            ignored_dirs: vec![
                ".git".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
            ],
        }
    }
}

impl WorkspaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_prefix(mut self, prefix: char) -> Self {
        self.reference_prefix = prefix;
        self
    }

    pub fn with_annotation_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotation_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_code_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.code_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_chain_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chain_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_topic_field(mut self, field: impl Into<String>) -> Self {
        self.topic_field = field.into();
        self
    }

    pub fn with_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_code_field(&self, name: &str) -> bool {
        self.code_fields.iter().any(|f| f.eq_ignore_ascii_case(name))
    }

    pub fn is_chain_field(&self, name: &str) -> bool {
        self.chain_fields.iter().any(|f| f.eq_ignore_ascii_case(name))
    }

    /// Whether a file with this extension affects compilation.
    pub fn is_context_extension(&self, ext: &str) -> bool {
        self.context_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }
}
