//! History Logger

use alert_model::{Alert, HistoryEvent};
use chrono::{DateTime, Utc};

/// Append one history entry mirroring the alert's current state.
///
/// Entries are only ever pushed to the back, so `history` stays in
/// chronological order.
pub fn record_history(mut alert: Alert, entry_id: &str, at: DateTime<Utc>) -> Alert {
    let entry = HistoryEvent {
        id: entry_id.to_string(),
        event: alert.event.clone(),
        status: alert.status,
        severity: alert.severity.clone(),
        value: alert.value.clone(),
        event_type: alert.event_type.clone(),
        text: alert.text.clone(),
        update_time: at,
    };
    alert.history.push(entry);
    alert
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::{AlertDraft, Status};
    use chrono::Duration;

    #[test]
    fn test_appends_snapshot_at_back() {
        let t0 = Utc::now();
        let mut draft = AlertDraft::new("db01", "ReplicationLag", "prod", "warning");
        draft.value = "12s".to_string();
        draft.event_type = "exceptionAlert".to_string();
        let alert = record_history(Alert::from_draft("a-1", &draft, t0), "a-1", t0);

        let mut changed = alert.clone();
        changed.severity = "major".to_string();
        changed.status = Status::Ack;
        changed.value = "95s".to_string();
        let t1 = t0 + Duration::seconds(30);
        let changed = record_history(changed, "r-2", t1);

        assert_eq!(changed.history.len(), 2);
        assert_eq!(changed.history[0], alert.history[0]);

        let last = &changed.history[1];
        assert_eq!(last.id, "r-2");
        assert_eq!(last.severity, "major");
        assert_eq!(last.status, Status::Ack);
        assert_eq!(last.value, "95s");
        assert_eq!(last.event_type, "exceptionAlert");
        assert_eq!(last.update_time, t1);
    }
}
