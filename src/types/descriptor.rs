//! Static descriptors for preloadable resources.

use serde::{Deserialize, Serialize};

/// Preload priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Stable lowercase name, matching the config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Which preload strategy a resource uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Plain HTTP fetch; the response body is cached verbatim.
    Html,
    /// Hidden-frame warm-up; only a status record is cached, the payload
    /// lands in the host's own HTTP cache.
    Iframe,
}

impl ResourceKind {
    /// Stable lowercase name, used as the `strategy` metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Html => "html",
            ResourceKind::Iframe => "iframe",
        }
    }
}

/// One preloadable resource.
///
/// Static configuration, never mutated at runtime. `id` doubles as the
/// cache key (scoped by the cache prefix) and must be unique across the
/// full descriptor list — [`MuninnBuilder::build()`](crate::MuninnBuilder::build)
/// rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl ResourceDescriptor {
    /// Descriptor for an HTML page fetched over plain HTTP.
    pub fn html(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            kind: ResourceKind::Html,
            priority: None,
        }
    }

    /// Descriptor for an embeddable dashboard warmed via a hidden frame.
    pub fn iframe(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            kind: ResourceKind::Iframe,
            priority: None,
        }
    }

    /// Set the priority tier.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_constructors() {
        let d = ResourceDescriptor::html("server-monitoring", "/server-monitoring");
        assert_eq!(d.kind, ResourceKind::Html);
        assert_eq!(d.priority, None);

        let d = ResourceDescriptor::iframe("grafana-mysql", "http://grafana:3000/d/mysql")
            .priority(Priority::High);
        assert_eq!(d.kind, ResourceKind::Iframe);
        assert_eq!(d.priority, Some(Priority::High));
    }

    #[test]
    fn kind_field_serialises_as_type() {
        let d = ResourceDescriptor::iframe("a", "http://x/");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains(r#""type":"iframe""#));
    }
}
