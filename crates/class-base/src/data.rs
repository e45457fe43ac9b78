//! Key-path data store with bubbling change notification.

use class_base_key_path::{self as key_path, KeyPath, KeyPathError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::event::EventsManager;
use crate::mix::Class;
use crate::Result;

/// Payload of a `change:<path>` event.
///
/// `trigger` is the path the event is emitted for, `target` the path that was
/// written, `data` the written value. For a write to `a.b` the `change:a`
/// event carries `trigger = "a"` and `target = "a.b"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub trigger: String,
    pub target: String,
    pub data: Value,
}

impl ChangeEvent {
    /// Read the payload back from handler arguments.
    pub fn from_args(args: &[Value]) -> Option<Self> {
        args.first()
            .and_then(|payload| serde_json::from_value(payload.clone()).ok())
    }

    pub fn into_value(self) -> Value {
        json!({
            "trigger": self.trigger,
            "target": self.target,
            "data": self.data,
        })
    }
}

/// Data store capability.
pub trait DataManager: EventsManager {
    fn data(&self) -> &Value;

    fn data_mut(&mut self) -> &mut Value;

    /// Value at `path`, `None` if the path is malformed or does not lead
    /// anywhere. Falsy values such as `0`, `false` or `""` are returned.
    fn get(&self, path: &str) -> Option<&Value> {
        match KeyPath::parse(path) {
            Ok(path) => key_path::get(self.data(), path.segments()),
            Err(err) => {
                trace!(path, %err, "get: malformed path");
                None
            }
        }
    }

    /// Write and notify.
    fn set(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        self.set_with(path, value, true)
    }

    /// Write without notifying.
    fn set_silent(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        self.set_with(path, value, false)
    }

    /// Write `value` at `path`, creating missing intermediate objects.
    ///
    /// A malformed path or a non-object intermediate makes this a no-op.
    /// With `notify`, `change:<path>` is triggered for the written path and
    /// then for each ancestor, deepest first.
    fn set_with(&mut self, path: &str, value: Value, notify: bool) -> Result<&mut Self> {
        let path = match KeyPath::parse(path) {
            Ok(path) => path,
            Err(err) => {
                trace!(path, %err, "set: malformed path");
                return Ok(self);
            }
        };
        let notification = notify.then(|| value.clone());
        if let Err(err) = write_path(self.data_mut(), &path, value) {
            trace!(%path, %err, "set: write rejected");
            return Ok(self);
        }
        debug!(%path, notify, "set");

        let Some(data) = notification else {
            return Ok(self);
        };
        let target = path.to_string();
        for step in path.ancestors() {
            let trigger = step.to_string();
            let event = self.options().change_event(&trigger);
            let payload = ChangeEvent {
                trigger,
                target: target.clone(),
                data: data.clone(),
            };
            self.trigger(&event, &[payload.into_value()])?;
        }
        Ok(self)
    }
}

fn write_path(root: &mut Value, path: &KeyPath, value: Value) -> Result<(), KeyPathError> {
    if !root.is_object() {
        *root = Value::Object(Default::default());
    }
    key_path::set(root, path.segments(), value).map(|_| ())
}

/// Named operations of the data capability: `set(path, value, notify?)`.
pub fn data_manager_class<H: DataManager>() -> Class<H> {
    Class::new("DataManager").with_method("set", |host: &mut H, args: &[Value]| {
        let Some(path) = args.first().and_then(Value::as_str) else {
            return Ok(());
        };
        let value = args.get(1).cloned().unwrap_or(Value::Null);
        let notify = args.get(2).and_then(Value::as_bool).unwrap_or(true);
        host.set_with(path, value, notify)?;
        Ok(())
    })
}
