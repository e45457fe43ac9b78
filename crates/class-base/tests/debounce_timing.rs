use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use class_base::prelude::*;
use class_base::{Base, Callback, Clock, Error, ManualClock, Options};
use serde_json::{json, Value};

type Calls = Rc<RefCell<Vec<(Duration, Vec<Value>)>>>;

fn setup() -> (Base, ManualClock) {
    let clock = ManualClock::new();
    let base = Base::builder().clock(clock.clone()).build().unwrap();
    (base, clock)
}

fn recorder(clock: &ManualClock) -> (Calls, Callback<Base>) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let clock = clock.clone();
    let callback = Callback::new(move |_: &mut Base, args: &[Value]| {
        sink.borrow_mut().push((clock.now(), args.to_vec()));
        Ok(())
    });
    (calls, callback)
}

fn advance(base: &mut Base, clock: &ManualClock, ms: u64) -> usize {
    clock.advance_ms(ms);
    base.run_timers().unwrap()
}

#[test]
fn debounced_subscription_fires_once_with_last_args() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    base.on_with("input", &handler, 10, true);

    base.trigger("input", &[json!(1)]).unwrap();
    advance(&mut base, &clock, 50);
    base.trigger("input", &[json!(2)]).unwrap();
    advance(&mut base, &clock, 50);
    base.trigger("input", &[json!(3)]).unwrap();

    assert_eq!(advance(&mut base, &clock, 199), 0);
    assert!(calls.borrow().is_empty());
    assert_eq!(advance(&mut base, &clock, 1), 1);

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (Duration::from_millis(300), vec![json!(3)]));
}

#[test]
fn debounced_subscription_stores_the_wrapper() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    base.on_with("input", &handler, 10, true);

    // the raw handler was never stored
    base.off_handler("input", &handler);
    base.trigger("input", &[]).unwrap();
    advance(&mut base, &clock, 200);
    assert_eq!(calls.borrow().len(), 1);

    let wrapper = base.debounce_function(&handler);
    base.off_handler("input", &wrapper);
    assert!(!base.events().contains("input"));
}

#[test]
fn method_debounce_trailing_runs_without_args() {
    let class = Base::class()
        .extend("Saver")
        .with_method("save", |this: &mut Base, args: &[Value]| {
            let saves = this.get("saves").and_then(Value::as_u64).unwrap_or(0);
            this.set_silent("saves", json!(saves + 1))?;
            this.set_silent("args", json!(args.len()))?;
            Ok(())
        });
    let clock = ManualClock::new();
    let mut base = Base::builder()
        .class(class)
        .clock(clock.clone())
        .build()
        .unwrap();

    for _ in 0..3 {
        base.debounce("save").unwrap();
        advance(&mut base, &clock, 50);
    }
    assert_eq!(base.get("saves"), None);
    advance(&mut base, &clock, 150);
    assert_eq!(base.get("saves"), Some(&json!(1)));
    assert_eq!(base.get("args"), Some(&json!(0)));
}

#[test]
fn leading_debounce_runs_first_call_only() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    let wait = Duration::from_millis(200);

    base.debounce_with(&handler, wait, true).unwrap();
    advance(&mut base, &clock, 100);
    base.debounce_with(&handler, wait, true).unwrap();
    assert_eq!(calls.borrow().len(), 1);

    // the second call re-armed the window until t=300
    advance(&mut base, &clock, 150);
    base.debounce_with(&handler, wait, true).unwrap();
    assert_eq!(calls.borrow().len(), 1);

    advance(&mut base, &clock, 200);
    base.debounce_with(&handler, wait, true).unwrap();
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn named_debounce_method_uses_arguments() {
    let class = Base::class()
        .extend("Clicker")
        .with_method("click", |this: &mut Base, _: &[Value]| {
            let clicks = this.get("clicks").and_then(Value::as_u64).unwrap_or(0);
            this.set_silent("clicks", json!(clicks + 1))?;
            Ok(())
        });
    let clock = ManualClock::new();
    let mut base = Base::builder()
        .class(class)
        .clock(clock.clone())
        .build()
        .unwrap();

    assert!(base.invoke("debounce", &[json!("click"), json!(30), json!(true)]).unwrap());
    assert!(base.invoke("debounce", &[json!("click"), json!(30), json!(true)]).unwrap());
    assert_eq!(base.get("clicks"), Some(&json!(1)));
    assert_eq!(base.next_timer_deadline(), Some(Duration::from_millis(30)));
    advance(&mut base, &clock, 30);
    assert_eq!(base.pending_timers(), 0);
}

#[test]
fn default_wait_comes_from_options() {
    let clock = ManualClock::new();
    let mut base = Base::builder()
        .options(Options::default().with_default_wait(Duration::from_millis(20)))
        .clock(clock.clone())
        .build()
        .unwrap();
    let (calls, handler) = recorder(&clock);
    base.debounce(&handler).unwrap();
    assert_eq!(advance(&mut base, &clock, 20), 1);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn timers_armed_while_draining_wait_for_next_drain() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    let rearm = Callback::new(move |this: &mut Base, _: &[Value]| {
        this.debounce_with(&handler, Duration::ZERO, false)
    });
    base.debounce_with(&rearm, Duration::from_millis(10), false).unwrap();

    assert_eq!(advance(&mut base, &clock, 10), 1);
    assert!(calls.borrow().is_empty());
    assert_eq!(base.pending_timers(), 1);
    assert_eq!(advance(&mut base, &clock, 0), 1);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn failing_timer_keeps_remaining_queued() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    let failing = Callback::new(|_: &mut Base, _: &[Value]| Err(Error::callback("timer failed")));
    base.debounce_with(&failing, Duration::from_millis(5), false).unwrap();
    base.debounce_with(&handler, Duration::from_millis(10), false).unwrap();

    clock.advance_ms(10);
    let err = base.run_timers().unwrap_err();
    assert_eq!(err.to_string(), "timer failed");
    assert_eq!(base.pending_timers(), 1);
    assert_eq!(base.run_timers().unwrap(), 1);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn removing_last_debounced_subscription_evicts_wrapper() {
    let (mut base, clock) = setup();
    let (_, handler) = recorder(&clock);
    base.on_with("save autosave", &handler, 10, true);
    assert_eq!(base.debounce_registry().cached_wrappers(), 1);

    let wrapper = base.debounce_function(&handler);
    base.off_handler("save", &wrapper);
    assert_eq!(base.debounce_registry().cached_wrappers(), 1);
    assert_eq!(base.debounce_function(&handler), wrapper);

    base.off_handler("autosave", &wrapper);
    assert_eq!(base.debounce_registry().cached_wrappers(), 0);
    assert_ne!(base.debounce_function(&handler), wrapper);
}

#[test]
fn huge_wait_after_clock_moved_does_not_panic() {
    let (mut base, clock) = setup();
    let (calls, handler) = recorder(&clock);
    clock.advance_ms(1);
    base.debounce_with(&handler, Duration::MAX, false).unwrap();
    let wrapper = base.debounce_function_with(&handler, Duration::MAX, false);
    base.on("tick", wrapper);
    base.trigger("tick", &[json!(1)]).unwrap();
    assert_eq!(advance(&mut base, &clock, 60_000), 0);
    assert!(calls.borrow().is_empty());
    assert_eq!(base.next_timer_deadline(), Some(Duration::MAX));
}
