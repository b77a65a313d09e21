pub mod admin_dto;
pub mod auth_dto;
pub mod quiz_dto;
