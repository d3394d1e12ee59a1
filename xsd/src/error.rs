use thiserror::Error;

/// Failures that abort a lowering run. Everything else is reported as a
/// [`Diagnostic`](crate::Diagnostic) and skipped.
#[derive(Debug, Error)]
pub enum XsdError {
    #[error("the document is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("expected a <schema> root element, found <{found}>")]
    MissingSchemaRoot { found: String },
}
