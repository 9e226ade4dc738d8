//! MQTT Notifier
//!
//! Publishes every committed change as JSON to
//! `{topic_prefix}/{environment}/{resource}`.

use crate::notifier::Notifier;
use crate::NotifyError;
use alert_model::{Alert, ChangeEvent, ChangeKind};
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// MQTT backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub topic_prefix: String,
    pub keep_alive_secs: u64,
    /// 0, 1 or 2
    pub qos: u8,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "alert-correlator".to_string(),
            topic_prefix: "alerts".to_string(),
            keep_alive_secs: 30,
            qos: 1,
        }
    }
}

/// Message body published for each change
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeMessage<'a> {
    kind: ChangeKind,
    state_change: bool,
    previous_severity: Option<&'a str>,
    alert: &'a Alert,
}

pub struct MqttNotifier {
    name: String,
    topic_prefix: String,
    qos: QoS,
    client: AsyncClient,
}

impl MqttNotifier {
    /// Create the client and spawn its event loop. The broker connection is
    /// established lazily by the event loop and re-attempted after errors.
    pub fn connect(name: &str, config: &MqttConfig) -> Result<Self, NotifyError> {
        let qos = qos_level(config.qos)?;

        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));

        let (client, mut eventloop) = AsyncClient::new(options, 64);

        let notifier = name.to_string();
        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!(notifier = %notifier, "MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!(notifier = %notifier, "MQTT error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        info!(
            "MQTT notifier {} publishing to {}:{}",
            name, config.broker_host, config.broker_port
        );
        Ok(Self {
            name: name.to_string(),
            topic_prefix: config.topic_prefix.clone(),
            qos,
            client,
        })
    }
}

#[async_trait]
impl Notifier for MqttNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        let topic = topic_for(&self.topic_prefix, &event.current);
        let payload = payload_for(event)?;

        self.client
            .publish(&topic, self.qos, false, payload)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

fn qos_level(level: u8) -> Result<QoS, NotifyError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(NotifyError::Config(format!("unsupported MQTT QoS {}", other))),
    }
}

/// Topic segments come from submitted data, so wildcard and separator
/// characters are replaced.
fn topic_for(prefix: &str, alert: &Alert) -> String {
    fn segment(raw: &str) -> String {
        raw.chars()
            .map(|c| if matches!(c, '+' | '#' | '/') { '_' } else { c })
            .collect()
    }
    format!(
        "{}/{}/{}",
        prefix,
        segment(&alert.environment),
        segment(&alert.resource)
    )
}

fn payload_for(event: &ChangeEvent) -> Result<Vec<u8>, NotifyError> {
    let message = ChangeMessage {
        kind: event.kind,
        state_change: event.is_state_change(),
        previous_severity: event.previous.as_ref().map(|p| p.severity.as_str()),
        alert: &event.current,
    };
    serde_json::to_vec(&message).map_err(|e| NotifyError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::AlertDraft;
    use chrono::Utc;

    fn alert(resource: &str, environment: &str) -> Alert {
        let draft = AlertDraft::new(resource, "cpu usage idle", environment, "major");
        Alert::from_draft("a-1", &draft, Utc::now())
    }

    #[test]
    fn test_topic_layout() {
        assert_eq!(
            topic_for("alerts", &alert("testServer01", "syd01")),
            "alerts/syd01/testServer01"
        );
    }

    #[test]
    fn test_topic_strips_wildcards() {
        assert_eq!(
            topic_for("alerts", &alert("web/+/#", "prod")),
            "alerts/prod/web____"
        );
    }

    #[test]
    fn test_payload_carries_change() {
        let before = alert("testServer01", "syd01");
        let mut after = before.clone();
        after.severity = "critical".to_string();

        let bytes = payload_for(&ChangeEvent::update(before, after)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["kind"], "update");
        assert_eq!(json["stateChange"], true);
        assert_eq!(json["previousSeverity"], "major");
        assert_eq!(json["alert"]["severity"], "critical");
        assert_eq!(json["alert"]["resource"], "testServer01");
    }

    #[test]
    fn test_qos_levels() {
        assert_eq!(qos_level(0).unwrap(), QoS::AtMostOnce);
        assert_eq!(qos_level(2).unwrap(), QoS::ExactlyOnce);
        assert!(matches!(qos_level(3), Err(NotifyError::Config(_))));
    }
}
