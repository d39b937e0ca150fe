pub mod manager;
pub mod models;
pub mod params;

pub use manager::{DatabaseError, DatabaseManager};
pub use params::{bind_params_as, bind_update_as};
