pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{AuthService, SessionService};
