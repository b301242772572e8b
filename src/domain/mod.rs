pub mod models;
pub mod seed;
pub mod services;
pub mod report;
pub mod errors;

pub use models::*;
pub use seed::*;
pub use services::*;
pub use report::*;
pub use errors::*;
