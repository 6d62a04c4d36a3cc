use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatterError {
    /// The tree has no source form that parses back to the same tree.
    #[error("Cannot print {0} as rule source")]
    Unrepresentable(String),
}
