pub mod service;

pub use service::{Deploy, DeployStatus, EnvVar, Service, ServiceStatus};
