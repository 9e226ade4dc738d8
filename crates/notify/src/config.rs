//! Notifier configuration

use crate::log_notifier::LogNotifier;
use crate::mqtt::{MqttConfig, MqttNotifier};
use crate::notifier::Notifier;
use crate::NotifyError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Log,
    Mqtt,
}

/// One configured notifier backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub kind: NotifierKind,
    /// Required when `kind` is `mqtt`
    #[serde(default)]
    pub mqtt: Option<MqttConfig>,
}

fn default_enabled() -> bool {
    true
}

impl NotifierConfig {
    pub fn log(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            kind: NotifierKind::Log,
            mqtt: None,
        }
    }
}

/// Instantiate every enabled backend. MQTT clients need a running tokio
/// runtime.
pub fn build_notifiers(configs: &[NotifierConfig]) -> Result<Vec<Arc<dyn Notifier>>, NotifyError> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    for config in configs.iter().filter(|c| c.enabled) {
        if config.name.is_empty() {
            return Err(NotifyError::Config("notifier name must not be empty".to_string()));
        }
        if notifiers.iter().any(|n| n.name() == config.name) {
            return Err(NotifyError::Config(format!(
                "duplicate notifier name {}",
                config.name
            )));
        }

        let notifier: Arc<dyn Notifier> = match config.kind {
            NotifierKind::Log => Arc::new(LogNotifier::new(&config.name)),
            NotifierKind::Mqtt => {
                let mqtt = config.mqtt.as_ref().ok_or_else(|| {
                    NotifyError::Config(format!("notifier {} is missing its mqtt section", config.name))
                })?;
                Arc::new(MqttNotifier::connect(&config.name, mqtt)?)
            }
        };
        info!("Registered notifier {} ({:?})", config.name, config.kind);
        notifiers.push(notifier);
    }

    Ok(notifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_backends_skipped() {
        let mut off = NotifierConfig::log("quiet");
        off.enabled = false;

        let built = build_notifiers(&[NotifierConfig::log("audit"), off]).unwrap();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].name(), "audit");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let configs = [NotifierConfig::log("audit"), NotifierConfig::log("audit")];
        assert!(matches!(build_notifiers(&configs), Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_mqtt_requires_section() {
        let config = NotifierConfig {
            name: "broker".to_string(),
            enabled: true,
            kind: NotifierKind::Mqtt,
            mqtt: None,
        };
        assert!(matches!(build_notifiers(&[config]), Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: NotifierConfig =
            serde_json::from_str(r#"{"name": "audit", "kind": "log"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.kind, NotifierKind::Log);
        assert!(config.mqtt.is_none());
    }
}
