//! Test builders — ergonomic constructors for evtx-shaped event records.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// EventBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for one event record as the evtx decoder renders it.
///
/// # Example
///
/// ```rust
/// let event = EventBuilder::new(4624)
///     .time("2024-01-15T10:00:00.000000Z")
///     .record_id(7)
///     .data("TargetUserName", "alice")
///     .build();
/// ```
pub struct EventBuilder {
    event_id: Value,
    time: Option<String>,
    record_id: u64,
    channel: String,
    data: Map<String, Value>,
}

impl EventBuilder {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id: json!(event_id),
            time: Some("2024-01-15T10:00:00.000000Z".to_string()),
            record_id: 1,
            channel: "Security".to_string(),
            data: Map::new(),
        }
    }

    /// `EventID` with attributes, the shape some providers emit.
    pub fn qualified(event_id: i64) -> Self {
        let mut builder = Self::new(event_id);
        builder.event_id = json!({ "#attributes": { "Qualifiers": 16384 }, "#text": event_id });
        builder
    }

    pub fn time(mut self, ts: &str) -> Self {
        self.time = Some(ts.to_string());
        self
    }

    pub fn no_time(mut self) -> Self {
        self.time = None;
        self
    }

    pub fn record_id(mut self, id: u64) -> Self {
        self.record_id = id;
        self
    }

    pub fn channel(mut self, channel: &str) -> Self {
        self.channel = channel.to_string();
        self
    }

    pub fn data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Value {
        let mut system = Map::new();
        system.insert("EventID".into(), self.event_id);
        system.insert("EventRecordID".into(), json!(self.record_id));
        system.insert("Channel".into(), json!(self.channel));
        if let Some(ts) = self.time {
            system.insert("TimeCreated".into(), json!({ "#attributes": { "SystemTime": ts } }));
        }
        json!({ "Event": { "System": system, "EventData": self.data } })
    }
}

/// A record with no `Event.System.EventID` at all.
pub fn event_without_id() -> Value {
    json!({ "Event": { "System": { "EventRecordID": 99, "Channel": "Security" } } })
}

/// `n` events with `event_id`, record ids `first..first + n`, one second apart.
pub fn events(event_id: i64, first: u64, n: u64) -> Vec<Value> {
    (first..first + n)
        .map(|id| {
            EventBuilder::new(event_id)
                .record_id(id)
                .time(&format!("2024-01-15T10:{:02}:{:02}.000000Z", (id / 60) % 60, id % 60))
                .build()
        })
        .collect()
}

/// `Event.System.EventRecordID` of a decoded record.
pub fn record_id(data: &Value) -> u64 {
    data["Event"]["System"]["EventRecordID"]
        .as_u64()
        .expect("record has no EventRecordID")
}
