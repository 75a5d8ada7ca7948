//! Preload configuration: base resources plus dashboard instance records.
//!
//! Configuration is declarative and static — the orchestrator never mutates
//! it. It can be built in code or loaded from a TOML file:
//!
//! ```toml
//! [[resources]]
//! id = "server-monitoring"
//! url = "/server-monitoring"
//! type = "html"
//!
//! [[grafana]]
//! base_url = "http://grafana.internal:3000"
//!
//! [[grafana.dashboards]]
//! id = "mysql-overview"
//! path = "/d/MQWgroiiz/mysql-overview?orgId=1&kiosk"
//! priority = "medium"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::{Priority, ResourceDescriptor, ResourceKind};
use crate::{MuninnError, Result};

/// Id prefix for descriptors generated from dashboard records.
const GRAFANA_ID_PREFIX: &str = "grafana-";

/// Full preload configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreloadConfig {
    /// Base descriptor list, preloaded as declared.
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
    /// Dashboard instances; each contributes one iframe descriptor per
    /// declared dashboard.
    #[serde(default)]
    pub grafana: Vec<GrafanaInstance>,
}

/// One Grafana (or similar) instance and the dashboards it serves.
#[derive(Debug, Clone, Deserialize)]
pub struct GrafanaInstance {
    pub base_url: String,
    #[serde(default)]
    pub dashboards: Vec<DashboardRef>,
}

/// One dashboard on an instance.
///
/// Generates a descriptor with id `grafana-{id}` and url `base_url + path`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardRef {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl PreloadConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MuninnError::Configuration(format!("failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MuninnError::Configuration(format!("failed to parse config: {e}")))
    }

    /// The full descriptor list: base resources plus one generated iframe
    /// descriptor per declared dashboard, optionally filtered by priority.
    ///
    /// Pure function of the configuration; no side effects. When `filter`
    /// is set, only descriptors whose priority equals it are returned —
    /// descriptors without a priority are excluded by any filter.
    pub fn resource_list(&self, filter: Option<Priority>) -> Vec<ResourceDescriptor> {
        let mut list = self.resources.clone();

        for instance in &self.grafana {
            for dashboard in &instance.dashboards {
                list.push(ResourceDescriptor {
                    id: format!("{GRAFANA_ID_PREFIX}{}", dashboard.id),
                    url: format!("{}{}", instance.base_url, dashboard.path),
                    kind: ResourceKind::Iframe,
                    priority: dashboard.priority,
                });
            }
        }

        if let Some(priority) = filter {
            list.retain(|descriptor| descriptor.priority == Some(priority));
        }

        list
    }

    /// The first duplicate id across the full descriptor list, if any.
    ///
    /// Duplicates would silently overwrite each other's cache entries, so
    /// the builder rejects them at composition time.
    pub(crate) fn duplicate_id(&self) -> Option<String> {
        let mut seen = std::collections::HashSet::new();
        for descriptor in self.resource_list(None) {
            if !seen.insert(descriptor.id.clone()) {
                return Some(descriptor.id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PreloadConfig {
        PreloadConfig {
            resources: vec![
                ResourceDescriptor::html("server-monitoring", "/server-monitoring"),
                ResourceDescriptor::iframe(
                    "grafana-server-dashboard",
                    "http://grafana:3000/d/node-exporter-full?kiosk",
                )
                .priority(Priority::High),
            ],
            grafana: vec![GrafanaInstance {
                base_url: "http://grafana:3000".to_string(),
                dashboards: vec![
                    DashboardRef {
                        id: "mysql-overview".to_string(),
                        path: "/d/MQWgroiiz/mysql-overview?kiosk".to_string(),
                        priority: Some(Priority::Medium),
                    },
                    DashboardRef {
                        id: "mysql-queries".to_string(),
                        path: "/d/mysql-queries".to_string(),
                        priority: Some(Priority::Low),
                    },
                ],
            }],
        }
    }

    #[test]
    fn full_list_merges_base_and_generated() {
        let list = sample().resource_list(None);
        assert_eq!(list.len(), 4);

        let generated = list.iter().find(|d| d.id == "grafana-mysql-overview");
        let generated = generated.expect("generated descriptor present");
        assert_eq!(generated.url, "http://grafana:3000/d/MQWgroiiz/mysql-overview?kiosk");
        assert_eq!(generated.kind, ResourceKind::Iframe);
        assert_eq!(generated.priority, Some(Priority::Medium));
    }

    #[test]
    fn priority_filter_selects_only_matching() {
        let high = sample().resource_list(Some(Priority::High));
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id, "grafana-server-dashboard");

        let low = sample().resource_list(Some(Priority::Low));
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "grafana-mysql-queries");
    }

    #[test]
    fn unprioritised_descriptors_match_no_filter() {
        let medium = sample().resource_list(Some(Priority::Medium));
        assert!(medium.iter().all(|d| d.priority == Some(Priority::Medium)));
        assert!(!medium.iter().any(|d| d.id == "server-monitoring"));
    }

    #[test]
    fn duplicate_detection_spans_generated_ids() {
        let mut config = sample();
        assert_eq!(config.duplicate_id(), None);

        // A base resource colliding with a generated dashboard id.
        config
            .resources
            .push(ResourceDescriptor::html("grafana-mysql-overview", "/x"));
        assert_eq!(
            config.duplicate_id(),
            Some("grafana-mysql-overview".to_string())
        );
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
            [[resources]]
            id = "server-monitoring"
            url = "/server-monitoring"
            type = "html"

            [[grafana]]
            base_url = "http://grafana:3000"

            [[grafana.dashboards]]
            id = "mysql-overview"
            path = "/d/MQWgroiiz/mysql-overview?kiosk"
            priority = "medium"
        "#;
        let config = PreloadConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.resources.len(), 1);
        assert_eq!(config.resources[0].kind, ResourceKind::Html);
        assert_eq!(config.grafana[0].dashboards[0].priority, Some(Priority::Medium));
        assert_eq!(config.resource_list(None).len(), 2);
    }

    #[test]
    fn empty_config_parses() {
        let config = PreloadConfig::from_toml_str("").unwrap();
        assert!(config.resource_list(None).is_empty());
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = PreloadConfig::load("/nonexistent/muninn.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
