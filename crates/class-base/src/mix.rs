//! Class descriptors and their structural composition.
//!
//! A [`Class`] is a named bag of own members: static members (plain values
//! or functions) and instance methods ([`Callback`]s). Composition never
//! mutates its inputs; [`Class::mixin`] and [`Class::mixto`] return a fresh
//! descriptor whose members are copied from each input in a fixed order,
//! later copies overwriting earlier ones.
//!
//! ```
//! use class_base::Class;
//! use serde_json::json;
//!
//! struct Host;
//!
//! let a: Class<Host> = Class::new("A").with_static("who", json!("a"));
//! let b: Class<Host> = Class::new("B").with_static("who", json!("b"));
//! let me: Class<Host> = Class::new("Me").with_static("who", json!("me"));
//!
//! assert_eq!(me.mixin(&[&a, &b]).static_value("who"), Some(&json!("me")));
//! assert_eq!(me.mixto(&[&a, &b]).static_value("who"), Some(&json!("b")));
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::callback::Callback;
use crate::Result;

/// Member names never copied by composition.
pub const RESERVED_MEMBERS: [&str; 3] = ["constructor", "prototype", "name"];

pub type StaticFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A type-level member.
#[derive(Clone)]
pub enum StaticMember {
    Value(Value),
    Function(StaticFn),
}

impl StaticMember {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Function(_) => None,
        }
    }
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Function(func) => f
                .debug_tuple("Function")
                .field(&(Rc::as_ptr(func) as *const ()))
                .finish(),
        }
    }
}

impl From<Value> for StaticMember {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_MEMBERS.contains(&name)
}

/// Named descriptor of statics and instance methods for hosts of type `H`.
pub struct Class<H> {
    name: String,
    statics: IndexMap<String, StaticMember>,
    methods: IndexMap<String, Callback<H>>,
}

impl<H> Class<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statics: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_method<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut H, &[Value]) -> Result<()> + 'static,
    {
        self.with_callback(name, Callback::new(func))
    }

    pub fn with_callback(mut self, name: impl Into<String>, callback: Callback<H>) -> Self {
        self.define_method(name, callback);
        self
    }

    /// Add or replace an instance method, returning the replaced one.
    pub fn define_method(
        &mut self,
        name: impl Into<String>,
        callback: Callback<H>,
    ) -> Option<Callback<H>> {
        self.methods.insert(name.into(), callback)
    }

    pub fn with_static(mut self, name: impl Into<String>, member: impl Into<StaticMember>) -> Self {
        self.define_static(name, member);
        self
    }

    pub fn with_static_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.with_static(name, StaticMember::Function(Rc::new(func)))
    }

    pub fn define_static(
        &mut self,
        name: impl Into<String>,
        member: impl Into<StaticMember>,
    ) -> Option<StaticMember> {
        self.statics.insert(name.into(), member.into())
    }

    pub fn method(&self, name: &str) -> Option<&Callback<H>> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn static_member(&self, name: &str) -> Option<&StaticMember> {
        self.statics.get(name)
    }

    pub fn static_value(&self, name: &str) -> Option<&Value> {
        self.static_member(name).and_then(StaticMember::as_value)
    }

    /// Call a static function. `None` if `name` is missing or is a plain
    /// value.
    pub fn call_static(&self, name: &str, args: &[Value]) -> Option<Result<Value>> {
        match self.static_member(name)? {
            StaticMember::Function(func) => Some(func(args)),
            StaticMember::Value(_) => None,
        }
    }

    /// Method names in definition order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn static_names(&self) -> impl Iterator<Item = &str> {
        self.statics.keys().map(String::as_str)
    }

    /// Compose with `self` taking precedence.
    ///
    /// Members are applied from the last source to the first, then from
    /// `self`, so `self` beats the first source, which beats the second.
    pub fn mixin(&self, sources: &[&Class<H>]) -> Class<H> {
        let mut mixed = Class::new(format!("{}Mix", self.name));
        for source in sources.iter().rev() {
            mixed.copy_members(source);
        }
        mixed.copy_members(self);
        debug!(
            class = %mixed.name,
            sources = sources.len(),
            methods = mixed.methods.len(),
            statics = mixed.statics.len(),
            "mixin"
        );
        mixed
    }

    /// Compose with the sources taking precedence.
    ///
    /// `self` is applied first, then each source in order, so the last
    /// source wins every conflict.
    pub fn mixto(&self, sources: &[&Class<H>]) -> Class<H> {
        let mut mixed = Class::new(format!("{}Mix", self.name));
        mixed.copy_members(self);
        for source in sources {
            mixed.copy_members(source);
        }
        debug!(
            class = %mixed.name,
            sources = sources.len(),
            methods = mixed.methods.len(),
            statics = mixed.statics.len(),
            "mixto"
        );
        mixed
    }

    /// Derive a class with the same members under `name`. Members defined on
    /// the result afterwards override the inherited ones.
    pub fn extend(&self, name: impl Into<String>) -> Class<H> {
        Class {
            name: name.into(),
            statics: self.statics.clone(),
            methods: self.methods.clone(),
        }
    }

    fn copy_members(&mut self, source: &Class<H>) {
        for (name, member) in &source.statics {
            if !is_reserved(name) {
                self.statics.insert(name.clone(), member.clone());
            }
        }
        for (name, method) in &source.methods {
            if !is_reserved(name) {
                self.methods.insert(name.clone(), method.clone());
            }
        }
    }
}

impl<H> Clone for Class<H> {
    fn clone(&self) -> Self {
        self.extend(self.name.clone())
    }
}

impl<H> fmt::Debug for Class<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<H> fmt::Display for Class<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Host {
        log: Vec<&'static str>,
    }

    fn tagged(tag: &'static str) -> Class<Host> {
        Class::new(tag)
            .with_static("a", json!(tag))
            .with_method("run", move |host: &mut Host, _: &[Value]| {
                host.log.push(tag);
                Ok(())
            })
    }

    fn run(class: &Class<Host>) -> Vec<&'static str> {
        let mut host = Host::default();
        class
            .method("run")
            .unwrap()
            .invoke(&mut host, &[])
            .unwrap();
        host.log
    }

    #[test]
    fn test_mixin_self_beats_first_beats_last() {
        let me = tagged("me");
        let (a, b) = (tagged("A"), tagged("B"));

        let mixed = me.mixin(&[&a, &b]);
        assert_eq!(mixed.static_value("a"), Some(&json!("me")));
        assert_eq!(run(&mixed), vec!["me"]);

        let bare: Class<Host> = Class::new("Bare");
        let mixed = bare.mixin(&[&a, &b]);
        assert_eq!(mixed.static_value("a"), Some(&json!("A")));
        assert_eq!(run(&mixed), vec!["A"]);
    }

    #[test]
    fn test_mixto_last_source_wins() {
        let me = tagged("me");
        let (a, b) = (tagged("A"), tagged("B"));

        let mixed = me.mixto(&[&a, &b]);
        assert_eq!(mixed.static_value("a"), Some(&json!("B")));
        assert_eq!(run(&mixed), vec!["B"]);

        let only_self = me.mixto(&[]);
        assert_eq!(only_self.static_value("a"), Some(&json!("me")));
    }

    #[test]
    fn test_union_of_members() {
        let a: Class<Host> = Class::new("A").with_static("x", json!(1));
        let b: Class<Host> = Class::new("B")
            .with_static("y", json!(2))
            .with_method("go", |_: &mut Host, _: &[Value]| Ok(()));
        let mixed = Class::new("Me").mixin(&[&a, &b]);
        assert_eq!(mixed.static_names().collect::<Vec<_>>(), vec!["y", "x"]);
        assert!(mixed.has_method("go"));
    }

    #[test]
    fn test_sources_untouched_and_name_synthesized() {
        let me = tagged("me");
        let a = tagged("A");
        let mixed = me.mixin(&[&a]);
        assert_eq!(mixed.name(), "meMix");
        assert_eq!(a.static_value("a"), Some(&json!("A")));
        assert_eq!(me.static_value("a"), Some(&json!("me")));
    }

    #[test]
    fn test_reserved_members_not_copied() {
        let a: Class<Host> = Class::new("A")
            .with_static("name", json!("A"))
            .with_static("prototype", json!({}))
            .with_method("constructor", |_: &mut Host, _: &[Value]| Ok(()))
            .with_static("kept", json!(true));
        let mixed = Class::new("Me").mixto(&[&a]);
        assert_eq!(mixed.static_names().collect::<Vec<_>>(), vec!["kept"]);
        assert!(!mixed.has_method("constructor"));
        assert_eq!(mixed.name(), "MeMix");
    }

    #[test]
    fn test_static_functions() {
        let class: Class<Host> = Class::new("Math")
            .with_static_fn("double", |args: &[Value]| {
                Ok(json!(args.first().and_then(Value::as_i64).unwrap_or(0) * 2))
            })
            .with_static("pi", json!(3));
        assert_eq!(class.call_static("double", &[json!(21)]).unwrap().unwrap(), json!(42));
        assert!(class.call_static("pi", &[]).is_none());
        assert!(class.call_static("missing", &[]).is_none());
    }

    #[test]
    fn test_extend_overrides() {
        let base = tagged("base");
        let child = base
            .extend("Child")
            .with_method("run", |host: &mut Host, _: &[Value]| {
                host.log.push("child");
                Ok(())
            });
        assert_eq!(child.name(), "Child");
        assert_eq!(child.static_value("a"), Some(&json!("base")));
        assert_eq!(run(&child), vec!["child"]);
        assert_eq!(run(&base), vec!["base"]);
    }
}
