//! Plugin identifiers.

use serde::{Deserialize, Serialize};

/// Identifier for an optional feature module known to the framework.
///
/// This is a closed set: every plugin that can appear in an activation list
/// is named here, and configuration files refer to plugins by the
/// snake_case form of these variants (e.g. `http_client`).
///
/// An identifier carries no behaviour on its own — it is resolved to a
/// [`PluginDescriptor`](super::PluginDescriptor) through a
/// [`PluginRegistry`](super::PluginRegistry) at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginId {
    /// Shared outbound HTTP client.
    HttpClient,
    /// OpenTelemetry tracer/meter providers.
    OpenTelemetry,
    /// Object-document mapping layer.
    Odm,
    /// RabbitMQ connection and channel management.
    RabbitMq,
}

impl PluginId {
    /// All known plugin identifiers, in declaration order.
    pub const ALL: [PluginId; 4] = [
        PluginId::HttpClient,
        PluginId::OpenTelemetry,
        PluginId::Odm,
        PluginId::RabbitMq,
    ];

    /// Returns the stable snake_case name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpClient => "http_client",
            Self::OpenTelemetry => "opentelemetry",
            Self::Odm => "odm",
            Self::RabbitMq => "rabbitmq",
        }
    }
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_names_are_stable() {
        assert_eq!(PluginId::HttpClient.as_str(), "http_client");
        assert_eq!(PluginId::RabbitMq.to_string(), "rabbitmq");
    }

    #[test]
    fn test_id_serde_round_trip() {
        let json = serde_json::to_string(&PluginId::OpenTelemetry).unwrap();
        assert_eq!(json, "\"opentelemetry\"");
        let id: PluginId = serde_json::from_str("\"odm\"").unwrap();
        assert_eq!(id, PluginId::Odm);
    }
}
