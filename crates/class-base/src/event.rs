//! Instance-scoped, ordered, multi-handler events.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use tracing::{debug, trace};

use crate::callback::Handler;
use crate::debounce::DebounceManager;
use crate::mix::Class;
use crate::Result;

type Buckets<H> = BTreeMap<i64, Vec<Handler<H>>>;

/// Event name -> order -> handlers in registration order.
pub struct EventTable<H> {
    events: HashMap<String, Buckets<H>>,
}

impl<H> EventTable<H> {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Append `handler` to the `(event, order)` bucket. Returns `false` if it
    /// was already there.
    pub fn add(&mut self, event: &str, order: i64, handler: Handler<H>) -> bool {
        let bucket = self
            .events
            .entry(event.to_string())
            .or_default()
            .entry(order)
            .or_default();
        if bucket.contains(&handler) {
            return false;
        }
        bucket.push(handler);
        true
    }

    /// Remove `handler` from every order of `event`; emptied orders are
    /// dropped. Returns how many entries were removed.
    pub fn remove(&mut self, event: &str, handler: &Handler<H>) -> usize {
        let Some(buckets) = self.events.get_mut(event) else {
            return 0;
        };
        let mut removed = 0;
        buckets.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|h| h != handler);
            removed += before - handlers.len();
            !handlers.is_empty()
        });
        if buckets.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    pub fn clear(&mut self, event: &str) -> bool {
        self.events.remove(event).is_some()
    }

    pub fn clear_all(&mut self) {
        self.events.clear();
    }

    /// Handlers of `event` in dispatch order: ascending order, then
    /// registration order.
    pub fn handlers(&self, event: &str) -> Vec<Handler<H>> {
        self.events
            .get(event)
            .map(|buckets| buckets.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    pub fn orders(&self, event: &str) -> Vec<i64> {
        self.events
            .get(event)
            .map(|buckets| buckets.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `handler` is subscribed to any event.
    pub fn holds(&self, handler: &Handler<H>) -> bool {
        self.events
            .values()
            .flat_map(BTreeMap::values)
            .any(|handlers| handlers.contains(handler))
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<H> Default for EventTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for EventTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, buckets) in &self.events {
            map.entry(name, buckets);
        }
        map.finish()
    }
}

/// Event bus capability.
pub trait EventsManager: DebounceManager {
    fn events(&self) -> &EventTable<Self>;

    fn events_mut(&mut self) -> &mut EventTable<Self>;

    /// Subscribe `handler` to each whitespace-separated event in `events` at
    /// the default order.
    fn on(&mut self, events: &str, handler: impl Into<Handler<Self>>) -> &mut Self {
        let order = self.options().default_order;
        self.on_with(events, handler, order, false)
    }

    /// Subscribe at `order` (lower fires first). With `debounce`, a
    /// trailing-edge wrapper of `handler` is stored instead of `handler`.
    fn on_with(
        &mut self,
        events: &str,
        handler: impl Into<Handler<Self>>,
        order: i64,
        debounce: bool,
    ) -> &mut Self {
        let handler = handler.into();
        let stored = if debounce {
            Handler::Callback(self.debounce_function(handler))
        } else {
            handler
        };
        for event in events.split_whitespace() {
            let added = self.events_mut().add(event, order, stored.clone());
            debug!(event, order, debounce, added, "on");
        }
        self
    }

    /// Drop every handler of `event`.
    fn off(&mut self, event: &str) -> &mut Self {
        let cleared = self.events_mut().clear(event);
        debug!(event, cleared, "off");
        self
    }

    /// Remove `handler` from every order of `event`.
    ///
    /// When that was the last subscription of a cached debounce wrapper, the
    /// wrapper is evicted from the cache too.
    fn off_handler(&mut self, event: &str, handler: impl Into<Handler<Self>>) -> &mut Self {
        let handler = handler.into();
        let removed = self.events_mut().remove(event, &handler);
        debug!(event, removed, "off handler");
        if let Handler::Callback(callback) = &handler {
            if removed > 0
                && !self.events().holds(&handler)
                && self.debounce_registry_mut().forget_wrapper(callback)
            {
                trace!(event, "debounced wrapper evicted");
            }
        }
        self
    }

    /// Drop the whole event table.
    fn off_all(&mut self) -> &mut Self {
        self.events_mut().clear_all();
        debug!("off all");
        self
    }

    /// Call every handler of `event` with `args`, in order.
    ///
    /// The handler list is captured before dispatch, so subscriptions made
    /// by a handler apply from the next trigger on. The first handler error
    /// aborts the dispatch and is returned.
    fn trigger(&mut self, event: &str, args: &[Value]) -> Result<&mut Self> {
        let handlers = self.events().handlers(event);
        if handlers.is_empty() {
            trace!(event, "trigger: no handlers");
            return Ok(self);
        }
        trace!(event, handlers = handlers.len(), "trigger");
        for handler in &handlers {
            match self.resolve_handler(handler) {
                Some(callback) => callback.invoke(self, args)?,
                None => trace!(event, ?handler, "trigger: unresolved handler skipped"),
            }
        }
        Ok(self)
    }
}

/// Named operations of the event capability.
///
/// - `on(events, method_name, order?, debounce?)`
/// - `off(event?)`: without an event name the whole table is cleared.
/// - `trigger(event, ...args)`
pub fn events_manager_class<H: EventsManager>() -> Class<H> {
    Class::new("EventsManager")
        .with_method("on", |host: &mut H, args: &[Value]| {
            let (Some(events), Some(method)) = (
                args.first().and_then(Value::as_str),
                args.get(1).and_then(Value::as_str),
            ) else {
                return Ok(());
            };
            let order = args
                .get(2)
                .and_then(Value::as_i64)
                .unwrap_or(host.options().default_order);
            let debounce = args.get(3).and_then(Value::as_bool).unwrap_or(false);
            host.on_with(events, Handler::method(method), order, debounce);
            Ok(())
        })
        .with_method("off", |host: &mut H, args: &[Value]| {
            match args.first().and_then(Value::as_str) {
                Some(event) => host.off(event),
                None => host.off_all(),
            };
            Ok(())
        })
        .with_method("trigger", |host: &mut H, args: &[Value]| {
            if let Some((event, rest)) = args.split_first() {
                if let Some(event) = event.as_str() {
                    host.trigger(event, rest)?;
                }
            }
            Ok(())
        })
}
