#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod error;
pub mod roles_service;
pub mod status_service;
pub mod training_service;

pub use track_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthContext, PermissionError};
pub use error::{AppServicesError, RoleServiceError, StatusError, TrainingServiceError};
pub use roles_service::RoleService;
pub use status_service::{StatusService, StudentStatus};
pub use training_service::{LogTrainingRequest, TrainingService};
