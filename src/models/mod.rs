pub mod audit_log;
pub mod question;
pub mod response;
pub mod school;
pub mod session;
pub mod user;
