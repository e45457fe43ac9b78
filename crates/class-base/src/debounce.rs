//! Time-coalesced invocation of callables.
//!
//! Two modes, both keyed by callable identity rather than by name:
//!
//! - [`DebounceManager::debounce_with`] acts on a factory directly. Trailing
//!   edge (`immediate = false`) runs the factory once, without arguments,
//!   after `wait` has passed with no further request. Leading edge
//!   (`immediate = true`) runs it right away when no window is open and
//!   swallows requests until the window closes; every request re-arms the
//!   window.
//! - [`DebounceManager::debounce_function_with`] returns a wrapper callback
//!   applying the same policy and forwarding the arguments it was called
//!   with. Wrappers are cached per factory and `(wait, immediate)`.
//!
//! Nothing runs in the background: due timers fire when the owner calls
//! [`DebounceManager::run_timers`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::callback::{CallableId, Callback, Handler, HandlerKey};
use crate::clock::Clock;
use crate::mix::Class;
use crate::timer::{TimerId, TimerQueue, TimerTask};
use crate::{Options, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DebounceKey {
    Callable(CallableId),
    Method(String),
    Wrapper(u64),
}

impl DebounceKey {
    /// Method names are keyed by name, so hosts that build a fresh callback
    /// on every lookup still share one timer per method.
    fn of<H>(handler: &Handler<H>) -> Self {
        match handler {
            Handler::Callback(callback) => Self::Callable(callback.id()),
            Handler::Method(name) => Self::Method(name.clone()),
        }
    }
}

struct WrapperEntry<H> {
    wait: Duration,
    immediate: bool,
    wrapper: Callback<H>,
}

/// Per-instance debounce state: pending timers and cached wrappers.
pub struct DebounceRegistry<H> {
    timers: TimerQueue<H>,
    pending: HashMap<DebounceKey, TimerId>,
    wrappers: HashMap<HandlerKey, WrapperEntry<H>>,
    next_wrapper: u64,
}

impl<H> DebounceRegistry<H> {
    pub fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
            pending: HashMap::new(),
            wrappers: HashMap::new(),
            next_wrapper: 1,
        }
    }

    /// Whether `factory` has an open debounce window.
    pub fn is_debouncing(&self, factory: impl Into<Handler<H>>) -> bool {
        self.is_pending(&DebounceKey::of(&factory.into()))
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn cached_wrappers(&self) -> usize {
        self.wrappers.len()
    }

    /// Drop the cache entry holding `wrapper`. Returns `false` if no entry
    /// held it.
    pub fn forget_wrapper(&mut self, wrapper: &Callback<H>) -> bool {
        let before = self.wrappers.len();
        self.wrappers.retain(|_, entry| entry.wrapper != *wrapper);
        self.wrappers.len() != before
    }

    fn is_pending(&self, key: &DebounceKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Cancel the timer pending for `key`, if any, and schedule `task`.
    fn arm(&mut self, key: DebounceKey, deadline: Duration, task: TimerTask<H>) {
        if let Some(previous) = self.pending.remove(&key) {
            self.timers.cancel(previous);
        }
        let id = self.timers.schedule(deadline, task);
        self.pending.insert(key, id);
    }

    fn take_due(&mut self, now: Duration, watermark: TimerId) -> Option<TimerTask<H>> {
        let (id, task) = self.timers.pop_due(now, watermark)?;
        self.pending.retain(|_, pending| *pending != id);
        Some(task)
    }

    fn cached_wrapper(&self, key: &HandlerKey, wait: Duration, immediate: bool) -> Option<Callback<H>> {
        self.wrappers
            .get(key)
            .filter(|entry| entry.wait == wait && entry.immediate == immediate)
            .map(|entry| entry.wrapper.clone())
    }

    fn next_wrapper_key(&mut self) -> DebounceKey {
        let key = DebounceKey::Wrapper(self.next_wrapper);
        self.next_wrapper = self.next_wrapper.saturating_add(1);
        key
    }
}

impl<H> Default for DebounceRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for DebounceRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceRegistry")
            .field("timers", &self.timers)
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}

/// Debounce capability. Implementors own a [`DebounceRegistry`], a clock and
/// their [`Options`].
pub trait DebounceManager: Sized + 'static {
    fn debounce_registry(&self) -> &DebounceRegistry<Self>;

    fn debounce_registry_mut(&mut self) -> &mut DebounceRegistry<Self>;

    fn clock(&self) -> &dyn Clock;

    fn options(&self) -> &Options;

    /// Look up an instance method by name. Hosts without a method table
    /// resolve nothing.
    fn resolve_method(&self, _name: &str) -> Option<Callback<Self>> {
        None
    }

    fn resolve_handler(&self, handler: &Handler<Self>) -> Option<Callback<Self>> {
        match handler {
            Handler::Callback(callback) => Some(callback.clone()),
            Handler::Method(name) => self.resolve_method(name),
        }
    }

    /// Trailing-edge debounce with the default wait.
    fn debounce(&mut self, factory: impl Into<Handler<Self>>) -> Result<()> {
        let wait = self.options().default_wait();
        self.debounce_with(factory, wait, false)
    }

    /// Coalesce calls to `factory` within `wait`.
    ///
    /// An unresolvable factory is ignored. Errors from a leading-edge call
    /// are returned; trailing-edge errors surface from [`run_timers`].
    ///
    /// [`run_timers`]: DebounceManager::run_timers
    fn debounce_with(
        &mut self,
        factory: impl Into<Handler<Self>>,
        wait: Duration,
        immediate: bool,
    ) -> Result<()> {
        let handler = factory.into();
        let Some(callback) = self.resolve_handler(&handler) else {
            trace!(?handler, "debounce: unresolved factory ignored");
            return Ok(());
        };

        let key = DebounceKey::of(&handler);
        let deadline = self.clock().now().saturating_add(wait);
        let registry = self.debounce_registry_mut();
        let call_now = immediate && !registry.is_pending(&key);
        let deferred = callback.clone();
        registry.arm(
            key,
            deadline,
            Box::new(move |host: &mut Self| {
                if immediate {
                    Ok(())
                } else {
                    deferred.invoke(host, &[])
                }
            }),
        );
        trace!(?handler, ?deadline, immediate, call_now, "debounce armed");

        if call_now {
            callback.invoke(self, &[])?;
        }
        Ok(())
    }

    /// Trailing-edge wrapper with the default wait.
    fn debounce_function(&mut self, factory: impl Into<Handler<Self>>) -> Callback<Self> {
        let wait = self.options().default_wait();
        self.debounce_function_with(factory, wait, false)
    }

    /// Build (or reuse) a debounced wrapper around `factory`.
    ///
    /// The wrapper forwards its arguments: immediately on the leading edge,
    /// or those of the last call on the trailing edge. A method-name factory
    /// is resolved each time the wrapper runs.
    ///
    /// Cache entries live as long as the registry unless
    /// [`EventsManager::off_handler`](crate::EventsManager::off_handler)
    /// removes the last subscription of the wrapper.
    fn debounce_function_with(
        &mut self,
        factory: impl Into<Handler<Self>>,
        wait: Duration,
        immediate: bool,
    ) -> Callback<Self> {
        let handler = factory.into();
        let cache_key = handler.key();
        if let Some(wrapper) = self
            .debounce_registry()
            .cached_wrapper(&cache_key, wait, immediate)
        {
            return wrapper;
        }

        let key = self.debounce_registry_mut().next_wrapper_key();
        let wrapper = Callback::new(move |host: &mut Self, args: &[Value]| {
            let Some(target) = host.resolve_handler(&handler) else {
                trace!(?handler, "debounced wrapper: unresolved factory ignored");
                return Ok(());
            };
            let deadline = host.clock().now().saturating_add(wait);
            let registry = host.debounce_registry_mut();
            let call_now = immediate && !registry.is_pending(&key);
            let deferred = target.clone();
            let deferred_args = args.to_vec();
            registry.arm(
                key.clone(),
                deadline,
                Box::new(move |host: &mut Self| {
                    if immediate {
                        Ok(())
                    } else {
                        deferred.invoke(host, &deferred_args)
                    }
                }),
            );
            if call_now {
                target.invoke(host, args)?;
            }
            Ok(())
        });

        debug!(?cache_key, ?wait, immediate, "debounced wrapper created");
        self.debounce_registry_mut().wrappers.insert(
            cache_key,
            WrapperEntry {
                wait,
                immediate,
                wrapper: wrapper.clone(),
            },
        );
        wrapper
    }

    /// Fire every timer due at the current clock time, earliest first.
    ///
    /// Timers armed while firing wait for the next call. Stops at the first
    /// callback error; timers not yet fired stay queued.
    fn run_timers(&mut self) -> Result<usize> {
        let now = self.clock().now();
        let watermark = self.debounce_registry().timers.watermark();
        let mut fired = 0;
        while let Some(task) = self.debounce_registry_mut().take_due(now, watermark) {
            fired += 1;
            task(self)?;
        }
        if fired > 0 {
            debug!(fired, ?now, "debounce timers fired");
        }
        Ok(fired)
    }

    fn next_timer_deadline(&self) -> Option<Duration> {
        self.debounce_registry().next_deadline()
    }

    fn pending_timers(&self) -> usize {
        self.debounce_registry().pending_timers()
    }
}

/// Named operations of the debounce capability.
///
/// `debounce(method_name, wait_ms?, immediate?)`.
pub fn debounce_manager_class<H: DebounceManager>() -> Class<H> {
    Class::new("DebounceManager").with_method("debounce", |host: &mut H, args: &[Value]| {
        let Some(name) = args.first().and_then(Value::as_str) else {
            return Ok(());
        };
        let wait = args
            .get(1)
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
            .unwrap_or_else(|| host.options().default_wait());
        let immediate = args.get(2).and_then(Value::as_bool).unwrap_or(false);
        host.debounce_with(Handler::method(name), wait, immediate)
    })
}
