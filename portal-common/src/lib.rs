//! Data exchanged between the recruitment portal client and the backend services

mod applications;
mod auth;
mod health;
mod jobs;
mod registration;

pub use applications::{
    ApplicationList, ApplicationReceipt, ApplicationRequest, ApplicationSummary, Availability,
    Competence, CompetenceEntry, CompetenceExperience, CompetenceList, CompetenceProfileForm,
};
pub use auth::{Credentials, LoginResponse, Role, Session, User, VerifyResponse};
pub use health::{ServiceEndpoint, ServiceStatus};
pub use jobs::{Job, JobApplication, JobApplyForm, JobList};
pub use registration::{RegistrationForm, RegistrationRequest, UsernameAvailability};
