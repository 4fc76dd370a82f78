//! REST gateway
//!
//! [`DataGateway`] is the boundary the table talks to; [`DashboardClient`]
//! (crate root) implements it over HTTP.
//!
//! [`DashboardClient`]: crate::DashboardClient

mod execute;
mod gateway;

pub use gateway::DataGateway;
