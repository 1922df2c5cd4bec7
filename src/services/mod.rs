pub mod applications;
pub mod authz;
pub mod bids;
