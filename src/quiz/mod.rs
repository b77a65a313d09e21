pub mod loader;
pub mod ruleset;
pub mod scoring;
pub mod session;
