//! The composed base object.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::callback::Callback;
use crate::clock::{Clock, SystemClock};
use crate::data::{data_manager_class, DataManager};
use crate::debounce::{debounce_manager_class, DebounceManager, DebounceRegistry};
use crate::event::{events_manager_class, EventTable, EventsManager};
use crate::mix::Class;
use crate::{Options, Result};

/// Name of the lifecycle hook run once per construction.
pub const INITIALIZE: &str = "initialize";

thread_local! {
    static BASE_CLASS: Rc<Class<Base>> = Rc::new(Base::class());
}

/// An object carrying a data tree, an event table and debounce state, with
/// its behavior described by a [`Class`].
///
/// ```
/// use class_base::{Base, DataManager, EventsManager};
/// use serde_json::json;
///
/// let mut book = Base::new();
/// book.set("book.name", json!("tom uncle")).unwrap();
/// book.set("book.price", json!(15)).unwrap();
/// assert_eq!(book.get("book"), Some(&json!({"name": "tom uncle", "price": 15})));
/// assert_eq!(book.to_string(), "ClassBase");
/// ```
pub struct Base {
    class: Rc<Class<Base>>,
    options: Options,
    clock: Rc<dyn Clock>,
    data: Value,
    events: EventTable<Base>,
    debounce: DebounceRegistry<Base>,
}

impl Base {
    /// The `ClassBase` descriptor: the data, event and debounce operations
    /// plus a no-op `initialize`, composed with `mixin`.
    ///
    /// Derive from it with [`Class::extend`] to override `initialize` or add
    /// methods, then construct through [`Base::builder`].
    pub fn class() -> Class<Base> {
        Class::new("ClassBase")
            .with_method(INITIALIZE, |_: &mut Base, _: &[Value]| Ok(()))
            .mixin(&[
                &data_manager_class(),
                &events_manager_class(),
                &debounce_manager_class(),
            ])
            .extend("ClassBase")
    }

    /// Instance of the plain `ClassBase` with default options and the system
    /// clock. Its `initialize` does nothing, so construction cannot fail.
    pub fn new() -> Self {
        let class = BASE_CLASS.with(Rc::clone);
        Self::from_parts(class, Options::default(), Rc::new(SystemClock::new()))
    }

    pub fn builder() -> BaseBuilder {
        BaseBuilder::default()
    }

    fn from_parts(class: Rc<Class<Base>>, options: Options, clock: Rc<dyn Clock>) -> Self {
        Self {
            class,
            options,
            clock,
            data: Value::Object(Default::default()),
            events: EventTable::new(),
            debounce: DebounceRegistry::new(),
        }
    }

    pub fn class_def(&self) -> &Class<Base> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    /// Run `factory` against this instance.
    pub fn call<F>(&mut self, factory: F, args: &[Value]) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self, &[Value]) -> Result<()>,
    {
        factory(self, args)?;
        Ok(self)
    }

    /// Call the method `name` of this instance's class. Returns `false` when
    /// the class has no such method.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<bool> {
        let Some(method) = self.resolve_method(name) else {
            return Ok(false);
        };
        method.invoke(self, args)?;
        Ok(true)
    }

    pub fn responds_to(&self, name: &str) -> bool {
        self.class.has_method(name)
    }
}

impl Default for Base {
    fn default() -> Self {
        Self::new()
    }
}

impl DebounceManager for Base {
    fn debounce_registry(&self) -> &DebounceRegistry<Self> {
        &self.debounce
    }

    fn debounce_registry_mut(&mut self) -> &mut DebounceRegistry<Self> {
        &mut self.debounce
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn resolve_method(&self, name: &str) -> Option<Callback<Self>> {
        self.class.method(name).cloned()
    }
}

impl EventsManager for Base {
    fn events(&self) -> &EventTable<Self> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventTable<Self> {
        &mut self.events
    }
}

impl DataManager for Base {
    fn data(&self) -> &Value {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("class", &self.class.name())
            .field("options", &self.options)
            .field("data", &self.data)
            .field("events", &self.events)
            .field("debounce", &self.debounce)
            .finish()
    }
}

/// Builder for [`Base`] instances with a custom class, options or clock.
///
/// ```
/// use class_base::{Base, DataManager, ManualClock, Options};
/// use serde_json::{json, Value};
///
/// let class = Base::class()
///     .extend("Counter")
///     .with_method("initialize", |this: &mut Base, args: &[Value]| {
///         let start = args.first().cloned().unwrap_or(json!(0));
///         this.set("count", start)?;
///         Ok(())
///     });
///
/// let counter = Base::builder()
///     .class(class)
///     .options(Options::default().with_default_order(0))
///     .clock(ManualClock::new())
///     .args(vec![json!(5)])
///     .build()
///     .unwrap();
/// assert_eq!(counter.get("count"), Some(&json!(5)));
/// assert_eq!(counter.to_string(), "Counter");
/// ```
#[derive(Default)]
pub struct BaseBuilder {
    class: Option<Class<Base>>,
    options: Option<Options>,
    clock: Option<Rc<dyn Clock>>,
    args: Vec<Value>,
}

impl BaseBuilder {
    pub fn class(mut self, class: Class<Base>) -> Self {
        self.class = Some(class);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    /// Arguments passed to `initialize`.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Create the instance and run its `initialize` hook once.
    pub fn build(self) -> Result<Base> {
        let class = match self.class {
            Some(class) => Rc::new(class),
            None => BASE_CLASS.with(Rc::clone),
        };
        let clock: Rc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Rc::new(SystemClock::new()),
        };
        let mut base = Base::from_parts(class, self.options.unwrap_or_default(), clock);
        debug!(class = base.class_name(), args = self.args.len(), "construct");
        base.invoke(INITIALIZE, &self.args)?;
        Ok(base)
    }
}

impl fmt::Debug for BaseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseBuilder")
            .field("class", &self.class.as_ref().map(Class::name))
            .field("options", &self.options)
            .field("args", &self.args)
            .finish()
    }
}
