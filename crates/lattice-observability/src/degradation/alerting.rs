//! Alert thresholds: more than 3 degradations inside the window is a warning,
//! a component degraded for over 24h is critical.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::tracker::DegradationTracker;

const WARNING_EVENT_COUNT: usize = 3;
const CRITICAL_DEGRADED_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    None,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationAlert {
    pub level: AlertLevel,
    pub component: String,
    pub message: String,
}

/// Evaluate alerts over the tracker, counting events inside `window_secs`.
pub fn evaluate_alerts(tracker: &DegradationTracker, window_secs: i64) -> Vec<DegradationAlert> {
    let mut alerts = Vec::new();
    let mut seen = HashSet::new();

    for tracked in tracker.events() {
        let component = &tracked.event.component;
        if !seen.insert(component.clone()) {
            continue;
        }

        if let Some(duration) = tracker.degraded_duration(component) {
            if duration > chrono::Duration::hours(CRITICAL_DEGRADED_HOURS) {
                alerts.push(DegradationAlert {
                    level: AlertLevel::Critical,
                    component: component.clone(),
                    message: format!(
                        "{component} has been degraded for over {CRITICAL_DEGRADED_HOURS} hours"
                    ),
                });
                continue;
            }
        }

        let recent = tracker.count_recent(component, window_secs);
        if recent > WARNING_EVENT_COUNT {
            alerts.push(DegradationAlert {
                level: AlertLevel::Warning,
                component: component.clone(),
                message: format!(
                    "{component} has {recent} degradation events in the last {window_secs}s"
                ),
            });
        }
    }

    alerts
}
