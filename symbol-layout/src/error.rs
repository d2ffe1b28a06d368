use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no known class token in symbol file name `{0}`")]
    UnknownClass(String),
    #[error("no symbols to place")]
    NoSymbols,
    #[error("malformed annotation line `{line}`: {reason}")]
    MalformedAnnotation { line: String, reason: String },
}
