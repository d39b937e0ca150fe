use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    #[error("No data")]
    NoData,

    #[error("minEmployees ({min}) cannot be greater than maxEmployees ({max})")]
    MinExceedsMax { min: i64, max: i64 },

    #[error("{field} must be an integer, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}
