use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown table kind: {0}")]
    UnknownTableKind(String),
    #[error("column '{column}' is declared more than once in the feature schema")]
    DuplicateColumn { column: String },
    #[error("feature schema declares the label '{column}' as a non-categorical column")]
    LabelNotCategorical { column: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
