pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod questions;
pub mod quiz;
pub mod schools;
pub mod users;

use uuid::Uuid;

use crate::middleware::auth::Claims;

pub(crate) fn actor_id(claims: &Claims) -> Option<Uuid> {
    Uuid::parse_str(&claims.sub).ok()
}
