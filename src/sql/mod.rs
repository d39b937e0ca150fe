pub mod error;
pub mod partial_update;
pub mod search;
pub mod types;

pub use error::SqlError;
pub use partial_update::sql_for_partial_update;
pub use search::{sql_for_company_search, CompanySearch};
pub use types::*;
