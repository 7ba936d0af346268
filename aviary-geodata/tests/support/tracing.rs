//! Tracing test utilities for event capture.
//!
//! `init_test_tracing()` installs an `EventCaptureLayer` with
//! `tracing::subscriber::set_default()`, so each test sees only its own
//! events while the returned guard is alive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

// =============================================================================
// CapturedEvent: one recorded event
// =============================================================================

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

// =============================================================================
// EventStore: thread-safe accumulator of captured events
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct EventStore(Arc<Mutex<Vec<CapturedEvent>>>);

impl EventStore {
    /// All events with the given message, in emission order.
    pub fn find_events(&self, message: &str) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.message == message)
            .cloned()
            .collect()
    }

    /// All events at the given level.
    pub fn events_at(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

// =============================================================================
// EventCaptureLayer
// =============================================================================

pub struct EventCaptureLayer {
    store: EventStore,
}

impl<S: Subscriber> Layer<S> for EventCaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldVisitor(HashMap::new());
        event.record(&mut fields);
        let message = fields.0.remove("message").unwrap_or_default();

        self.store.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: fields.0,
        });
    }
}

struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Capture every event until the guard is dropped.
pub fn init_test_tracing() -> (EventStore, tracing::subscriber::DefaultGuard) {
    let store = EventStore::default();
    let layer = EventCaptureLayer {
        store: store.clone(),
    };
    let subscriber = tracing_subscriber::registry::Registry::default().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);
    (store, guard)
}
