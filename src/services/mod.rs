pub mod audit_service;
pub mod auth_service;
pub mod leaderboard_service;
pub mod progression_service;
pub mod question_service;
pub mod school_service;
pub mod session_service;
pub mod user_service;
