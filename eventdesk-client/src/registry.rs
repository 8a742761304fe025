//! Resources whose "update" is not a record update.

use std::collections::HashMap;

use http::Method;

/// Resource answering `POST /notifications/send-from-template/{id}` by sending the template.
pub const SEND_FROM_TEMPLATE: &str = "notifications/send-from-template";

/// Resource answering `PATCH /news/public/{id}` by toggling the public flag of a news item.
pub const NEWS_PUBLIC: &str = "news/public";

/// A one-shot server side job started through a body-less request to `{resource}/{id}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerAction {
    pub method: Method,
}

impl TriggerAction {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

/// How the data provider treats updates of a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Regular REST resource.
    Standard,
    /// Updates start a job instead of changing a record.
    Trigger(TriggerAction),
}

/// Maps resource identifiers to their [`ResourceKind`]. Unknown resources are standard.
#[derive(Clone, Debug)]
pub struct ResourceRegistry {
    kinds: HashMap<String, ResourceKind>,
}

impl Default for ResourceRegistry {
    /// The trigger actions offered by the admin screens.
    fn default() -> Self {
        Self::empty()
            .with_trigger(SEND_FROM_TEMPLATE, Method::POST)
            .with_trigger(NEWS_PUBLIC, Method::PATCH)
    }
}

impl ResourceRegistry {
    /// A registry treating every resource as standard.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    pub fn with_trigger(mut self, resource: &str, method: Method) -> Self {
        self.register(resource, ResourceKind::Trigger(TriggerAction::new(method)));
        self
    }

    pub fn register(&mut self, resource: &str, kind: ResourceKind) {
        self.kinds.insert(normalize(resource).to_string(), kind);
    }

    pub fn kind(&self, resource: &str) -> ResourceKind {
        self.kinds
            .get(normalize(resource))
            .cloned()
            .unwrap_or(ResourceKind::Standard)
    }
}

fn normalize(resource: &str) -> &str {
    resource.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_triggers() {
        let registry = ResourceRegistry::default();

        assert_eq!(
            registry.kind(SEND_FROM_TEMPLATE),
            ResourceKind::Trigger(TriggerAction::new(Method::POST))
        );
        assert_eq!(
            registry.kind("/news/public/"),
            ResourceKind::Trigger(TriggerAction::new(Method::PATCH))
        );
        assert_eq!(registry.kind("notifications"), ResourceKind::Standard);
        assert_eq!(registry.kind("news"), ResourceKind::Standard);
    }

    #[test]
    fn empty_registry() {
        assert_eq!(
            ResourceRegistry::empty().kind(SEND_FROM_TEMPLATE),
            ResourceKind::Standard
        );
    }
}
