pub mod auth;

pub use auth::employer_gate;
