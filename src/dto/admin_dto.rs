use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSchoolRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub email_domain: String,
    #[validate(email)]
    pub admin_email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub email_domain: Option<String>,
    #[validate(email)]
    pub admin_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub role: String,
    pub school_id: Option<Uuid>,
    pub school_year: Option<String>,
    pub classroom: Option<String>,
    pub subject_specialization: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub school_year: Option<String>,
    pub classroom: Option<String>,
    pub subject_specialization: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    pub school_id: Option<Uuid>,
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub topic: String,
    #[validate(length(min = 1))]
    pub question: String,
    pub answers: Vec<String>,
    #[validate(length(min = 1))]
    pub correct_answer: String,
    #[validate(length(min = 1))]
    pub school_year: String,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    pub topic: Option<String>,
    pub question: Option<String>,
    pub answers: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub school_year: Option<String>,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuestionsQuery {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub school_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
