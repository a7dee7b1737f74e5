use crate::domain::error::error_message;
use crate::domain::values::plan_tier::PlanTier;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AI-generated narrative about the user's trading, broken into sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    #[serde(default)]
    pub key_patterns: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub emotional_state_analysis: Option<String>,
    #[serde(default)]
    pub trading_performance_insights: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Plain-text insights from backends that return a single narrative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AiInsights {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(AiInsights {
                summary: Some(text.clone()),
                ..Default::default()
            }),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    /// Section titles paired with their bullet points, skipping empty ones.
    pub fn sections(&self) -> Vec<(&'static str, Vec<String>)> {
        let mut out = Vec::new();
        let mut push_list = |title: &'static str, items: &[String]| {
            if !items.is_empty() {
                out.push((title, items.to_vec()));
            }
        };
        push_list("Key Patterns", &self.key_patterns);
        push_list("Strengths", &self.strengths);
        push_list("Areas for Improvement", &self.areas_for_improvement);
        if let Some(text) = &self.emotional_state_analysis {
            out.push(("Emotional State Analysis", vec![text.clone()]));
        }
        if let Some(text) = &self.trading_performance_insights {
            out.push(("Trading Performance Insights", vec![text.clone()]));
        }
        if !self.recommendations.is_empty() {
            out.push(("Recommendations", self.recommendations.clone()));
        }
        if let Some(text) = &self.summary {
            out.push(("Summary", vec![text.clone()]));
        }
        out
    }
}

/// Plan metadata that governs how often insights may be regenerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    #[serde(default)]
    pub plan: PlanTier,
    #[serde(default)]
    pub can_get_insights: Option<bool>,
    #[serde(default)]
    pub last_insights_date: Option<String>,
    #[serde(default)]
    pub next_available_date: Option<String>,
}

impl PlanInfo {
    /// Read plan fields from the top level of a response body. Success and
    /// error bodies share this layout.
    pub fn from_body(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(String::from);
        PlanInfo {
            plan: text("plan").and_then(|p| p.parse().ok()).unwrap_or_default(),
            can_get_insights: body.get("can_get_insights").and_then(Value::as_bool),
            last_insights_date: text("last_insights_date"),
            next_available_date: text("next_available_date"),
        }
    }

    /// Plan fields riding on an error body, if the backend sent any.
    pub fn from_error_body(body: &Value) -> Option<Self> {
        let present = |key: &str| body.get(key).is_some_and(|v| !v.is_null());
        (present("can_get_insights") || present("next_available_date")).then(|| Self::from_body(body))
    }
}

/// Outcome of asking the backend for insights.
///
/// Plan metadata arrives in the success body when insights exist, in the
/// 404 body when they do not, and on refusals such as the 429 cooldown
/// reply. All of them are parsed with `PlanInfo::from_body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InsightsFetch {
    Loaded { insights: AiInsights, plan: PlanInfo },
    NotFound { plan: PlanInfo },
    Failed { message: String, plan: Option<PlanInfo> },
}

impl InsightsFetch {
    /// A failure with no response body, e.g. a transport error.
    pub fn failed(message: impl Into<String>) -> Self {
        InsightsFetch::Failed {
            message: message.into(),
            plan: None,
        }
    }

    pub fn from_response(status: u16, body: &Value) -> Self {
        match status {
            200..=299 => {
                if body.get("success").and_then(Value::as_bool) == Some(false) {
                    return InsightsFetch::Failed {
                        message: error_message(body).unwrap_or_else(|| "Failed to load insights".into()),
                        plan: PlanInfo::from_error_body(body),
                    };
                }
                let plan = PlanInfo::from_body(body);
                match body.get("insights").and_then(AiInsights::from_value) {
                    Some(mut insights) => {
                        if insights.created_at.is_none() {
                            insights.created_at = body
                                .get("insights_created_at")
                                .and_then(Value::as_str)
                                .map(String::from);
                        }
                        InsightsFetch::Loaded { insights, plan }
                    }
                    None => InsightsFetch::NotFound { plan },
                }
            }
            404 => InsightsFetch::NotFound {
                plan: PlanInfo::from_body(body),
            },
            _ => InsightsFetch::Failed {
                message: error_message(body).unwrap_or_else(|| format!("HTTP error! status: {status}")),
                plan: PlanInfo::from_error_body(body),
            },
        }
    }

    pub fn plan(&self) -> Option<&PlanInfo> {
        match self {
            InsightsFetch::Loaded { plan, .. } | InsightsFetch::NotFound { plan } => Some(plan),
            InsightsFetch::Failed { plan, .. } => plan.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_carries_insights_and_plan() {
        let body = json!({
            "success": true,
            "insights": {"key_patterns": ["Cuts losers early"], "recommendations": ["Size down on Fridays"]},
            "plan": "premium",
            "can_get_insights": false,
            "next_available_date": "2026-10-20T00:00:00",
            "insights_created_at": "2026-10-13T09:30:00"
        });
        match InsightsFetch::from_response(200, &body) {
            InsightsFetch::Loaded { insights, plan } => {
                assert_eq!(insights.key_patterns, vec!["Cuts losers early".to_string()]);
                assert_eq!(insights.created_at.as_deref(), Some("2026-10-13T09:30:00"));
                assert_eq!(plan.plan, PlanTier::Premium);
                assert_eq!(plan.can_get_insights, Some(false));
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn not_found_body_is_parsed_like_success() {
        let body = json!({
            "success": false,
            "error": "No stored insights",
            "plan": "pro",
            "can_get_insights": true,
            "next_available_date": null
        });
        let fetch = InsightsFetch::from_response(404, &body);
        assert_eq!(
            fetch,
            InsightsFetch::NotFound {
                plan: PlanInfo {
                    plan: PlanTier::Pro,
                    can_get_insights: Some(true),
                    last_insights_date: None,
                    next_available_date: None,
                }
            }
        );
    }

    #[test]
    fn server_error_becomes_failed() {
        let fetch = InsightsFetch::from_response(500, &json!({"error": "boom"}));
        assert_eq!(fetch, InsightsFetch::failed("boom"));
        assert!(fetch.plan().is_none());
    }

    #[test]
    fn cooldown_refusal_keeps_plan_fields() {
        let body = json!({
            "success": false,
            "error": "AI insights are limited to once every 7 days on the premium plan",
            "plan": "premium",
            "can_get_insights": false,
            "last_insights_date": "2026-06-24T12:00:00+00:00",
            "next_available_date": "2026-07-01T12:00:00+00:00"
        });
        let fetch = InsightsFetch::from_response(429, &body);
        let plan = fetch.plan().expect("plan from 429 body");
        assert_eq!(plan.plan, PlanTier::Premium);
        assert_eq!(plan.can_get_insights, Some(false));
        assert_eq!(plan.next_available_date.as_deref(), Some("2026-07-01T12:00:00+00:00"));
        assert!(matches!(fetch, InsightsFetch::Failed { ref message, .. } if message.contains("7 days")));
    }

    #[test]
    fn plain_text_insights_land_in_summary() {
        let body = json!({"success": true, "insights": "Mostly disciplined."});
        match InsightsFetch::from_response(200, &body) {
            InsightsFetch::Loaded { insights, .. } => {
                assert_eq!(insights.summary.as_deref(), Some("Mostly disciplined."));
                assert_eq!(insights.sections().len(), 1);
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }
}
