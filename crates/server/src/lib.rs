pub mod deployment;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod pages;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

pub use deployment::{AppDeployment, DeploymentError};

pub type DeploymentImpl = AppDeployment;
