pub mod auth;
pub mod converter;
pub mod docker;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod launcher;
pub mod naming;
pub mod waiter;

pub use auth::*;
pub use docker::*;
pub use error::*;
pub use executor::*;
pub use gateway::*;
pub use launcher::*;
pub use naming::*;
pub use waiter::*;
