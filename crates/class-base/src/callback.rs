//! Callables stored by the event bus and the debounce scheduler.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::Result;

type CallbackFn<H> = dyn Fn(&mut H, &[Value]) -> Result<()>;

/// Identity of a [`Callback`]: the address of its shared allocation.
///
/// Clones of a callback share an identity; two callbacks built from the same
/// closure source do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallableId(usize);

/// A shared callable invoked with the owning instance and arguments.
pub struct Callback<H> {
    func: Rc<CallbackFn<H>>,
}

impl<H> Callback<H> {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut H, &[Value]) -> Result<()> + 'static,
    {
        Self {
            func: Rc::new(func),
        }
    }

    pub fn id(&self) -> CallableId {
        CallableId(Rc::as_ptr(&self.func) as *const () as usize)
    }

    pub fn invoke(&self, host: &mut H, args: &[Value]) -> Result<()> {
        (self.func)(host, args)
    }
}

impl<H> Clone for Callback<H> {
    fn clone(&self) -> Self {
        Self {
            func: Rc::clone(&self.func),
        }
    }
}

impl<H> PartialEq for Callback<H> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<H> Eq for Callback<H> {}

impl<H> fmt::Debug for Callback<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.id()).finish()
    }
}

/// What an event subscription or a debounce request points at.
///
/// Method names are looked up on the instance every time they are needed,
/// so later overrides are picked up.
pub enum Handler<H> {
    Callback(Callback<H>),
    Method(String),
}

impl<H> Handler<H> {
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }

    pub fn key(&self) -> HandlerKey {
        match self {
            Self::Callback(callback) => HandlerKey::Callable(callback.id()),
            Self::Method(name) => HandlerKey::Method(name.clone()),
        }
    }
}

impl<H> Clone for Handler<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback(callback) => Self::Callback(callback.clone()),
            Self::Method(name) => Self::Method(name.clone()),
        }
    }
}

impl<H> PartialEq for Handler<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Callback(a), Self::Callback(b)) => a == b,
            (Self::Method(a), Self::Method(b)) => a == b,
            _ => false,
        }
    }
}

impl<H> Eq for Handler<H> {}

impl<H> fmt::Debug for Handler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(callback) => fmt::Debug::fmt(callback, f),
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
        }
    }
}

impl<H> From<Callback<H>> for Handler<H> {
    fn from(callback: Callback<H>) -> Self {
        Self::Callback(callback)
    }
}

impl<H> From<&Callback<H>> for Handler<H> {
    fn from(callback: &Callback<H>) -> Self {
        Self::Callback(callback.clone())
    }
}

impl<H> From<&str> for Handler<H> {
    fn from(name: &str) -> Self {
        Self::Method(name.to_string())
    }
}

impl<H> From<String> for Handler<H> {
    fn from(name: String) -> Self {
        Self::Method(name)
    }
}

/// Hashable identity of a [`Handler`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerKey {
    Callable(CallableId),
    Method(String),
}
