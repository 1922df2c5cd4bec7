pub mod application;
pub mod company;
pub mod freelancer;
pub mod interview;
pub mod job;
pub mod notification;
pub mod template;
pub mod user;

pub use application::{ApplicationStatus, JobApplication, JobApplicationWithApplicant};
pub use company::Company;
pub use freelancer::{FreelancerBid, FreelancerProject};
pub use interview::InterviewAttempt;
pub use job::Job;
pub use notification::Notification;
pub use template::JobTemplate;
pub use user::{PublicProfile, User};
