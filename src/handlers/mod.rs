pub mod applications;
pub mod auth;
pub mod company;
pub mod freelancer;
pub mod interviews;
pub mod jobs;
pub mod notifications;
pub mod settings;
pub mod templates;
