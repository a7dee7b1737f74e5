use crate::domain::values::plan_tier::PlanTier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub plan: PlanTier,
    #[serde(default)]
    pub last_ai_insights_date: Option<String>,
    #[serde(default)]
    pub next_ai_insights_date: Option<String>,
    #[serde(default)]
    pub can_get_ai_insights: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What `/api/auth/signup` hands back. No token; the caller logs in next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupReceipt {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_confirmed: Option<bool>,
}
