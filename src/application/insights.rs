//! Cooldown gate and view state for AI insights.

use crate::application::sequencer::{RequestCategory, RequestSequencer};
use crate::domain::entities::insights::{AiInsights, InsightsFetch, PlanInfo};
use crate::domain::error::DomainError;
use crate::domain::ports::insights_api::InsightsApi;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};

const DAY_MS: i64 = 86_400_000;

/// Parse the dates the backend uses for plan windows: RFC 3339, a naive ISO
/// datetime (UTC), or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_plan_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = s.parse::<NaiveDateTime>() {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    warn!("ignoring unparseable insights date '{s}'");
    None
}

/// Whether the user may ask for fresh insights right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub can_refresh: bool,
    /// Whole days until the next window opens, rounded up. Display only.
    pub days_until_next: i64,
}

impl Eligibility {
    pub fn evaluate(plan: &PlanInfo, now: DateTime<Utc>) -> Self {
        let next = plan.next_available_date.as_deref().and_then(parse_plan_date);
        let allowed = plan.can_get_insights == Some(true);
        let window_open = next.map_or(true, |n| n <= now);
        Self {
            can_refresh: allowed && window_open,
            days_until_next: next.map_or(0, |n| days_until(now, n)),
        }
    }

    pub fn closed() -> Self {
        Self {
            can_refresh: false,
            days_until_next: 0,
        }
    }
}

fn days_until(now: DateTime<Utc>, next: DateTime<Utc>) -> i64 {
    let ms = (next - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + DAY_MS - 1) / DAY_MS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    NoStoredInsights,
    Shown { refresh_enabled: bool },
    Failed { message: String },
}

/// What the insights view is showing.
///
/// `NoStoredInsights` until the first successful request, then `Shown` with
/// the refresh button tracking the cooldown gate. `tick` re-evaluates the
/// gate so an expired cooldown re-enables refresh without a round trip.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsPanel {
    pub state: PanelState,
    pub insights: Option<AiInsights>,
    pub plan: Option<PlanInfo>,
    pub eligibility: Eligibility,
}

impl Default for InsightsPanel {
    fn default() -> Self {
        Self {
            state: PanelState::NoStoredInsights,
            insights: None,
            plan: None,
            eligibility: Eligibility::closed(),
        }
    }
}

impl InsightsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a response into the panel. Any plan metadata the response
    /// carries, refusals included, replaces the cached plan first.
    pub fn apply(&mut self, fetch: InsightsFetch, now: DateTime<Utc>) {
        if let Some(plan) = fetch.plan() {
            self.plan = Some(plan.clone());
        }
        match fetch {
            InsightsFetch::Loaded { insights, .. } => {
                self.insights = Some(insights);
            }
            InsightsFetch::NotFound { .. } => {}
            InsightsFetch::Failed { message, .. } => {
                self.state = PanelState::Failed { message };
                self.eligibility = self.evaluate(now);
                return;
            }
        }
        self.tick(now);
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.eligibility = self.evaluate(now);
        self.state = if self.insights.is_some() {
            PanelState::Shown {
                refresh_enabled: self.eligibility.can_refresh,
            }
        } else {
            PanelState::NoStoredInsights
        };
    }

    pub fn cooldown_active(&self) -> bool {
        matches!(self.state, PanelState::Shown { refresh_enabled: false })
    }

    fn evaluate(&self, now: DateTime<Utc>) -> Eligibility {
        self.plan
            .as_ref()
            .map_or_else(Eligibility::closed, |plan| Eligibility::evaluate(plan, now))
    }
}

pub struct InsightsUseCase {
    api: Arc<dyn InsightsApi>,
    sequencer: Arc<RequestSequencer>,
    panel: Mutex<InsightsPanel>,
}

impl InsightsUseCase {
    pub fn new(api: Arc<dyn InsightsApi>, sequencer: Arc<RequestSequencer>) -> Self {
        Self {
            api,
            sequencer,
            panel: Mutex::new(InsightsPanel::new()),
        }
    }

    /// Load whatever insights the backend already has.
    pub async fn stored(&self, now: DateTime<Utc>) -> Result<InsightsPanel, DomainError> {
        let fetch = self
            .sequencer
            .run(RequestCategory::Insights, self.api.stored_insights())
            .await;
        self.resolve(fetch, now)
    }

    /// Generate fresh insights if the cooldown gate is open.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<InsightsPanel, DomainError> {
        let mut gate = self.eligibility(now)?;
        if !gate.can_refresh {
            // The cached plan may be missing or predate the window reopening.
            self.stored(now).await?;
            gate = self.eligibility(now)?;
        }
        if !gate.can_refresh {
            return Err(DomainError::InvalidInput(match gate.days_until_next {
                0 => "Insights are not available yet".to_string(),
                1 => "New insights available in 1 day".to_string(),
                n => format!("New insights available in {n} days"),
            }));
        }
        info!("requesting fresh insights");
        let fetch = self
            .sequencer
            .run(RequestCategory::Insights, self.api.generate_insights())
            .await;
        self.resolve(fetch, now)
    }

    pub fn eligibility(&self, now: DateTime<Utc>) -> Result<Eligibility, DomainError> {
        let mut panel = self.lock()?;
        panel.tick(now);
        Ok(panel.eligibility)
    }

    fn resolve(&self, fetch: Option<InsightsFetch>, now: DateTime<Utc>) -> Result<InsightsPanel, DomainError> {
        let mut panel = self.lock()?;
        if let Some(fetch) = fetch {
            panel.apply(fetch, now);
        }
        Ok(panel.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InsightsPanel>, DomainError> {
        self.panel
            .lock()
            .map_err(|e| DomainError::InvalidInput(format!("insights state poisoned: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn plan(can: Option<bool>, next: Option<&str>) -> PlanInfo {
        PlanInfo {
            can_get_insights: can,
            next_available_date: next.map(String::from),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn closed_when_plan_disallows_regardless_of_dates() {
        for next in [None, Some("2020-01-01"), Some("2030-01-01")] {
            let gate = Eligibility::evaluate(&plan(Some(false), next), now());
            assert!(!gate.can_refresh, "next = {next:?}");
        }
        assert!(!Eligibility::evaluate(&plan(None, None), now()).can_refresh);
    }

    #[test]
    fn open_when_allowed_and_window_passed_or_absent() {
        assert!(Eligibility::evaluate(&plan(Some(true), None), now()).can_refresh);
        assert!(Eligibility::evaluate(&plan(Some(true), Some("2026-10-15T08:00:00")), now()).can_refresh);
        assert!(Eligibility::evaluate(&plan(Some(true), Some("2026-10-16T12:00:00Z")), now()).can_refresh);
    }

    #[test]
    fn days_until_next_rounds_up_and_floors_at_zero() {
        let gate = Eligibility::evaluate(&plan(Some(true), Some("2026-10-18T00:00:00")), now());
        assert!(!gate.can_refresh);
        assert_eq!(gate.days_until_next, 2);

        let gate = Eligibility::evaluate(&plan(Some(true), Some("2026-10-16T12:00:01")), now());
        assert_eq!(gate.days_until_next, 1);

        let gate = Eligibility::evaluate(&plan(Some(true), Some("2026-10-01")), now());
        assert_eq!(gate.days_until_next, 0);
    }

    #[test]
    fn garbage_date_is_treated_as_absent() {
        assert!(parse_plan_date("next tuesday").is_none());
        let gate = Eligibility::evaluate(&plan(Some(true), Some("next tuesday")), now());
        assert!(gate.can_refresh);
        assert_eq!(gate.days_until_next, 0);
    }

    #[test]
    fn panel_walks_through_cooldown() {
        let mut panel = InsightsPanel::new();
        assert_eq!(panel.state, PanelState::NoStoredInsights);

        let next = (now() + Duration::days(7)).to_rfc3339();
        panel.apply(
            InsightsFetch::Loaded {
                insights: AiInsights::default(),
                plan: plan(Some(true), Some(&next)),
            },
            now(),
        );
        assert!(panel.cooldown_active());
        assert_eq!(panel.eligibility.days_until_next, 7);

        panel.tick(now() + Duration::days(8));
        assert_eq!(panel.state, PanelState::Shown { refresh_enabled: true });
    }

    #[test]
    fn refusal_with_plan_closes_the_gate() {
        let mut panel = InsightsPanel::new();
        panel.apply(InsightsFetch::NotFound { plan: plan(Some(true), None) }, now());
        assert!(panel.eligibility.can_refresh);

        let body = serde_json::json!({
            "success": false,
            "error": "cooling down",
            "plan": "premium",
            "can_get_insights": false,
            "next_available_date": "2026-10-20T12:00:00+00:00"
        });
        panel.apply(InsightsFetch::from_response(429, &body), now());
        assert_eq!(panel.state, PanelState::Failed { message: "cooling down".into() });
        assert!(!panel.eligibility.can_refresh);
        assert_eq!(panel.eligibility.days_until_next, 4);
        assert_eq!(panel.plan.as_ref().and_then(|p| p.can_get_insights), Some(false));
    }

    #[test]
    fn failure_keeps_previous_insights() {
        let mut panel = InsightsPanel::new();
        panel.apply(
            InsightsFetch::Loaded {
                insights: AiInsights::default(),
                plan: plan(Some(true), None),
            },
            now(),
        );
        panel.apply(InsightsFetch::failed("timeout"), now());
        assert_eq!(panel.state, PanelState::Failed { message: "timeout".into() });
        assert!(panel.insights.is_some());
    }
}
