use bindy_core::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload delivered to every handler of a fired event.
///
/// The host fills in `data` (and `triggered` for manual triggers); the event
/// layer stamps the recorded name, the delivery time and the owner
/// correlation id before a listener sees it.
///
/// The owner id is bookkeeping, not data: it is never serialized, so it cannot
/// collide with anything a caller enumerates or persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,

    /// Set for payloads produced by a manual trigger. The host may hand the
    /// same payload object to several handlers in turn.
    #[serde(default)]
    triggered: bool,

    #[serde(default)]
    data: Value,

    #[serde(skip)]
    owner: Option<Identity>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload for a manual trigger.
    pub fn triggered() -> Self {
        Self {
            triggered: true,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Event name recorded at delivery time.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Identity of the callback whose registration delivered this payload.
    pub fn owner(&self) -> Option<Identity> {
        self.owner
    }

    /// Record which registration is delivering this payload.
    ///
    /// Called by delivery wrappers right before the listener runs.
    pub fn stamp(&mut self, name: &str, owner: Identity, at: DateTime<Utc>) {
        self.name = Some(name.to_owned());
        self.timestamp = Some(at);
        self.owner = Some(owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindy_core::{IdentityTag, Tagged, identity};
    use serde_json::json;

    struct Owner(IdentityTag);

    impl Tagged for Owner {
        fn identity_tag(&self) -> &IdentityTag {
            &self.0
        }
    }

    #[test]
    fn stamping_records_delivery() {
        let owner = identity::get(&Owner(IdentityTag::new()));
        let now = Utc::now();

        let mut event = Event::triggered().with_data(json!({"x": 1}));
        event.stamp("click", owner, now);

        assert_eq!(event.name(), Some("click"));
        assert_eq!(event.timestamp(), Some(now));
        assert_eq!(event.owner(), Some(owner));
        assert!(event.is_triggered());
        assert_eq!(event.data(), &json!({"x": 1}));
    }

    #[test]
    fn owner_is_not_serialized() {
        let owner = identity::get(&Owner(IdentityTag::new()));
        let mut event = Event::new();
        event.stamp("click", owner, Utc::now());

        let value = serde_json::to_value(&event).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(!keys.contains(&"owner"));

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(back.owner(), None);
        assert_eq!(back.name(), Some("click"));
    }
}
