/// Inbound notification shape errors.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("notification is missing {field}")]
    MissingField { field: String },

    #[error("invalid {field}: {value}")]
    InvalidField { field: String, value: String },
}
