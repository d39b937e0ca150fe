pub mod company;
pub mod user;

pub use company::{Company, NewCompany};
pub use user::{NewUser, User};
