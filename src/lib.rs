pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod services;

use crate::services::{
    audit_service::AuditService, auth_service::AuthService,
    leaderboard_service::LeaderboardService, progression_service::ProgressionService,
    question_service::QuestionService, school_service::SchoolService,
    session_service::SessionService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub school_service: SchoolService,
    pub question_service: QuestionService,
    pub session_service: SessionService,
    pub progression_service: ProgressionService,
    pub leaderboard_service: LeaderboardService,
    pub audit_service: AuditService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let school_service = SchoolService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let session_service = SessionService::new(pool.clone());
        let progression_service = ProgressionService::new(pool.clone());
        let leaderboard_service = LeaderboardService::new(pool.clone());
        let audit_service = AuditService::new(pool.clone());

        Self {
            pool,
            auth_service,
            user_service,
            school_service,
            question_service,
            session_service,
            progression_service,
            leaderboard_service,
            audit_service,
        }
    }
}
