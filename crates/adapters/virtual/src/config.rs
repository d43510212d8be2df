//! Virtual adapter configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::custom::CustomDeviceDescriptor;

/// Configuration for the virtual device simulator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Periodically randomize every typed property of every device.
    pub drift_enabled: bool,
    /// Persist property values through the configured value store.
    pub persistence_enabled: bool,
    /// User-supplied device descriptors, instantiated alongside the
    /// built-in catalog on every discovery pass.
    pub custom_devices: Vec<CustomDeviceDescriptor>,
    /// Simulated camera stream settings.
    pub transcoder: TranscoderConfig,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            drift_enabled: false,
            persistence_enabled: true,
            custom_devices: Vec::new(),
            transcoder: TranscoderConfig::default(),
        }
    }
}

/// Settings for the external transcoding process behind the simulated
/// camera stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    /// Directory receiving the stream manifest and segment files.
    pub media_dir: PathBuf,
    /// Source asset looped into the simulated stream.
    pub source: PathBuf,
    /// Forward transcoder stderr output to the log.
    pub debug: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("media"),
            source: PathBuf::from("media/source.mp4"),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = VirtualConfig::default();
        assert!(!config.drift_enabled);
        assert!(config.persistence_enabled);
        assert!(config.custom_devices.is_empty());
        assert_eq!(config.transcoder.media_dir, PathBuf::from("media"));
        assert!(!config.transcoder.debug);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            drift_enabled = true
            persistence_enabled = false

            [transcoder]
            media_dir = "/var/lib/simthings/media"
            source = "/usr/share/simthings/source.mp4"
            debug = true
        "#;
        let config: VirtualConfig = toml::from_str(toml).unwrap();
        assert!(config.drift_enabled);
        assert!(!config.persistence_enabled);
        assert_eq!(
            config.transcoder.media_dir,
            PathBuf::from("/var/lib/simthings/media")
        );
        assert!(config.transcoder.debug);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"drift_enabled = true"#;
        let config: VirtualConfig = toml::from_str(toml).unwrap();
        assert!(config.drift_enabled);
        assert!(config.persistence_enabled);
    }

    #[test]
    fn should_parse_custom_devices() {
        let toml = r#"
            [[custom_devices]]
            id = "my-plug"
            title = "Garage Plug"

            [custom_devices.properties.on]
            type = "boolean"
            default = true
        "#;
        let config: VirtualConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.custom_devices.len(), 1);
        assert_eq!(config.custom_devices[0].id.as_deref(), Some("my-plug"));
    }
}
