use serde::{Deserialize, Serialize};

fn default_test_id_attribute() -> String {
    "data-testid".to_string()
}

fn default_language() -> String {
    "javascript".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_port() -> u16 {
    9324
}

/// User-facing recorder settings, mirrored in memory and persisted to the
/// config file. Wire keys are camelCase to match what the recorder UI sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Attribute name the selector engine prefers (e.g. "data-testid").
    #[serde(default = "default_test_id_attribute")]
    pub test_id_attribute_name: String,

    /// Target code-generation language.
    #[serde(default = "default_language")]
    pub target_language: String,

    /// Present the recorder UI as a side panel (true) or a popup (false).
    #[serde(default = "default_true")]
    pub sidepanel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            test_id_attribute_name: default_test_id_attribute(),
            target_language: default_language(),
            sidepanel: true,
        }
    }
}

/// Partial settings update; unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub test_id_attribute_name: Option<String>,
    pub target_language: Option<String>,
    pub sidepanel: Option<bool>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(name) = patch.test_id_attribute_name {
            self.test_id_attribute_name = name;
        }
        if let Some(language) = patch.target_language {
            self.target_language = language;
        }
        if let Some(sidepanel) = patch.sidepanel {
            self.sidepanel = sidepanel;
        }
    }
}

/// Service-level configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Local HTTP API port for the recorder UI and automation harnesses.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Analytics endpoint for usage telemetry. Unset disables telemetry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_endpoint: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            telemetry_endpoint: None,
        }
    }
}

/// Full on-disk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub service: ServiceConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_wire_keys_are_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json.get("testIdAttributeName").is_some());
        assert!(json.get("targetLanguage").is_some());
        assert!(json.get("sidepanel").is_some());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut settings = Settings::default();
        settings.apply(SettingsPatch {
            sidepanel: Some(false),
            ..Default::default()
        });
        assert!(!settings.sidepanel);
        assert_eq!(settings.target_language, "javascript");
        assert_eq!(settings.test_id_attribute_name, "data-testid");
    }
}
