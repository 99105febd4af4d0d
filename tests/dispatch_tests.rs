mod common;

use common::Harness;
use hotspot::{Behavior, DiagnosticKind, EventType, HotspotError, RawEvent, RawEventKind};
use std::cell::RefCell;
use std::rc::Rc;

/// Three stacked regions sharing the area around (5, 5), and one off to the
/// side. Every event is echoed by a wildcard `print_event` transition.
const STACK: &str = r#"{
    "regions": [
        {"name": "bottom", "x": 0, "y": 0, "w": 10, "h": 10},
        {"name": "middle", "x": 2, "y": 2, "w": 10, "h": 10},
        {"name": "top", "x": 4, "y": 4, "w": 10, "h": 10},
        {"name": "side", "x": 50, "y": 0, "w": 10, "h": 10}
    ],
    "states": [{"name": "watch", "transitions": [
        {"event": "enter", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "exit", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "press", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "move_inside", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "release", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "release_none", "actions": [{"type": "print_event"}], "next_state": "watch"},
        {"event": "rightClick", "actions": [{"type": "print_event"}], "next_state": "watch"}
    ]}]
}"#;

fn labels(console: Vec<String>) -> Vec<String> {
    console
        .into_iter()
        .map(|line| line.split(" at ").next().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn enters_and_kind_events_run_topmost_first() {
    let mut h = Harness::new(STACK);

    let dispatched = h.interactor.dispatch_raw_event(RawEventKind::Press, 5.0, 5.0).unwrap();
    let events: Vec<EventType> = dispatched.iter().map(|d| d.event).collect();
    assert_eq!(
        events,
        vec![
            EventType::Enter,
            EventType::Enter,
            EventType::Enter,
            EventType::Press,
            EventType::Press,
            EventType::Press,
        ]
    );
    assert_eq!(
        h.region_names(dispatched.iter().map(|d| d.region)),
        vec!["top", "middle", "bottom", "top", "middle", "bottom"]
    );
    assert!(dispatched.iter().all(|d| d.fired));

    assert_eq!(
        labels(h.interactor.take_console()),
        vec![
            "enter on top",
            "enter on middle",
            "enter on bottom",
            "press on top",
            "press on middle",
            "press on bottom",
        ]
    );
}

#[test]
fn every_exit_precedes_every_enter() {
    let mut h = Harness::new(STACK);
    h.interactor.dispatch_raw_event(RawEventKind::Move, 5.0, 5.0).unwrap();
    h.interactor.take_console();

    h.interactor.dispatch_raw_event(RawEventKind::Move, 55.0, 5.0).unwrap();
    assert_eq!(
        labels(h.interactor.take_console()),
        vec![
            "exit on top",
            "exit on middle",
            "exit on bottom",
            "enter on side",
            "move_inside on side",
        ]
    );
}

#[test]
fn partial_overlap_only_diffs_the_changed_regions() {
    let mut h = Harness::new(STACK);
    h.interactor.dispatch_raw_event(RawEventKind::Move, 5.0, 5.0).unwrap();
    h.interactor.take_console();

    // (11, 11) is inside middle and top only.
    h.interactor.dispatch_raw_event(RawEventKind::Move, 11.0, 11.0).unwrap();
    assert_eq!(
        labels(h.interactor.take_console()),
        vec!["exit on bottom", "move_inside on top", "move_inside on middle"]
    );
    assert_eq!(h.interactor.bookkeeping().len(), 2);
}

#[test]
fn release_over_nothing_is_a_single_release_none() {
    let mut h = Harness::new(STACK);
    let dispatched = h.interactor.dispatch_raw_event(RawEventKind::Release, 30.0, 30.0).unwrap();

    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].event, EventType::ReleaseNone);
    assert_eq!(dispatched[0].region, None);
    assert!(dispatched[0].fired);
    assert_eq!(labels(h.interactor.take_console()), vec!["release_none on <none>"]);
}

#[test]
fn release_over_regions_never_emits_release_none() {
    let mut h = Harness::new(STACK);
    let dispatched = h.interactor.dispatch_raw_event(RawEventKind::Release, 55.0, 5.0).unwrap();
    let events: Vec<EventType> = dispatched.iter().map(|d| d.event).collect();
    assert_eq!(events, vec![EventType::Enter, EventType::Release]);
}

#[test]
fn right_click_carries_local_position() {
    let mut h = Harness::new(STACK);
    h.interactor.set_position(100.0, 200.0);
    h.interactor.dispatch_raw_event(RawEventKind::RightClick, 155.0, 205.0).unwrap();
    assert_eq!(
        h.interactor.take_console(),
        vec!["enter on side at (55, 5)", "rightClick on side at (55, 5)"]
    );
}

#[test]
fn press_on_button_switches_state_and_image() {
    let mut h = Harness::new(
        r#"{
            "initial_state": "S0",
            "regions": [{"name": "btn", "w": 20, "h": 20}],
            "states": [
                {"name": "S0", "transitions": [
                    {"event": "press", "region": "btn",
                     "actions": [{"type": "set_image", "region": "btn", "param": "./a.png"}],
                     "next_state": "S1"}
                ]},
                {"name": "S1"}
            ]
        }"#,
    );

    h.interactor.dispatch_raw_event(RawEventKind::Press, 10.0, 10.0).unwrap();

    let fsm = h.interactor.fsm().unwrap();
    assert_eq!(fsm.current_state().as_str(), "S1");
    let btn = fsm.region_named("btn").unwrap();
    assert_eq!(btn.image_location(), "./a.png");
    assert!(!btn.loaded());
    assert!(fsm.is_terminal());
    assert!(h.scheduler.take_redraw());
}

#[test]
fn exact_region_beats_wildcard_and_unmatched_is_absorbed() {
    let mut h = Harness::new(
        r#"{
            "regions": [
                {"name": "a", "w": 10, "h": 10},
                {"name": "b", "x": 20, "w": 10, "h": 10}
            ],
            "states": [
                {"name": "idle", "transitions": [
                    {"event": "press", "region": "a", "next_state": "from_a"},
                    {"event": "press", "region": "*", "next_state": "from_any"}
                ]},
                {"name": "from_a"},
                {"name": "from_any"}
            ]
        }"#,
    );

    h.interactor.dispatch_raw_event(RawEventKind::Press, 5.0, 5.0).unwrap();
    assert_eq!(h.interactor.current_state(), Some("from_a"));

    h.interactor.reset();
    assert_eq!(h.interactor.current_state(), Some("idle"));
    h.interactor.dispatch_raw_event(RawEventKind::Press, 25.0, 5.0).unwrap();
    assert_eq!(h.interactor.current_state(), Some("from_any"));

    let dispatched = h.interactor.dispatch_raw_event(RawEventKind::Move, 5.0, 5.0).unwrap();
    assert!(dispatched.iter().all(|d| !d.fired));
    assert_eq!(h.interactor.current_state(), Some("from_any"));
    assert!(h.interactor.diagnostics().is_empty());
}

#[test]
fn unmatched_events_can_be_reported() {
    let mut h = Harness::new(r#"{"regions": [{"name": "a", "w": 1, "h": 1}], "states": [{"name": "quiet"}]}"#);
    h.interactor.set_report_unmatched(true);
    h.interactor.dispatch_raw_event(RawEventKind::Release, 30.0, 30.0).unwrap();
    assert_eq!(h.interactor.diagnostics().count(DiagnosticKind::Unmatched), 1);
}

#[test]
fn fatal_action_aborts_without_updating_bookkeeping() {
    let mut h = Harness::new(
        r#"{
            "regions": [{"name": "a", "w": 10, "h": 10}],
            "states": [
                {"name": "idle", "transitions": [
                    {"event": "enter", "actions": [{"type": "print", "param": "hello"}], "next_state": "idle"},
                    {"event": "press", "actions": [{"type": "explode"}], "next_state": "boom"}
                ]},
                {"name": "boom"}
            ]
        }"#,
    );

    let err = h.interactor.dispatch_raw_event(RawEventKind::Press, 5.0, 5.0).unwrap_err();
    assert!(matches!(err, HotspotError::UnknownAction(ref name) if name == "explode"));
    assert!(err.is_fatal());

    assert_eq!(h.interactor.current_state(), Some("idle"));
    assert!(h.interactor.bookkeeping().is_empty());
    assert_eq!(h.interactor.take_console(), vec!["hello"]);
}

#[test]
fn malformed_param_is_fatal() {
    let mut h = Harness::new(
        r#"{
            "regions": [{"name": "a", "w": 10, "h": 10}],
            "states": [{"name": "idle", "transitions": [
                {"event": "press", "region": "a",
                 "actions": [{"type": "move_to", "region": "a", "param": "ten,twenty"}],
                 "next_state": "idle"}
            ]}]
        }"#,
    );
    let err = h.interactor.dispatch(&RawEvent::new(RawEventKind::Press, 1.0, 1.0)).unwrap_err();
    assert!(matches!(err, HotspotError::ActionParam { .. }));
}

#[test]
fn unbound_action_is_reported_once_and_does_nothing() {
    let mut h = Harness::new(
        r#"{
            "regions": [{"name": "a", "w": 10, "h": 10}],
            "states": [{"name": "idle", "transitions": [
                {"event": "press", "region": "a",
                 "actions": [
                    {"type": "move_to", "region": "ghost", "param": "1,1"},
                    {"type": "print", "region": "ghost", "param": "still runs"}
                 ],
                 "next_state": "idle"}
            ]}]
        }"#,
    );
    assert_eq!(h.interactor.diagnostics().count(DiagnosticKind::Binding), 1);

    h.interactor.dispatch_raw_event(RawEventKind::Press, 5.0, 5.0).unwrap();
    assert_eq!(h.interactor.take_console(), vec!["still runs"]);
    let a = h.interactor.fsm().unwrap().region_named("a").unwrap();
    assert_eq!((a.x(), a.y()), (0.0, 0.0));
}

#[test]
fn later_actions_see_earlier_mutations() {
    let mut h = Harness::new(
        r#"{
            "regions": [{"name": "a", "w": 4, "h": 4}],
            "states": [{"name": "idle", "transitions": [
                {"event": "press", "region": "a",
                 "actions": [
                    {"type": "move_to", "region": "a", "param": "10,10"},
                    {"type": "move_by", "region": "a", "param": "1,2"},
                    {"type": "center_on_pointer", "region": "a"},
                    {"type": "move_by", "region": "a", "param": "0.5,0"}
                 ],
                 "next_state": "idle"}
            ]}]
        }"#,
    );
    h.interactor.dispatch_raw_event(RawEventKind::Press, 3.0, 3.0).unwrap();
    let a = h.interactor.fsm().unwrap().region_named("a").unwrap();
    assert_eq!((a.x(), a.y()), (1.5, 1.0));
}

#[test]
fn damage_is_idempotent_for_unchanged_values() {
    let mut h = Harness::new(STACK);
    let before = h.scheduler.damage_count();

    let fsm = h.interactor.fsm_mut().unwrap();
    let id = fsm.find_region("side").unwrap();
    let side = fsm.region_mut(id).unwrap();

    side.set_x(50.0);
    assert_eq!(h.scheduler.damage_count(), before);

    side.set_x(51.0);
    assert_eq!(h.scheduler.damage_count(), before + 1);
    assert!(h.scheduler.take_redraw());
    assert!(!h.scheduler.take_redraw());
}

#[derive(Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl Behavior for Recorder {
    fn invoke(&mut self, param: &str, event: EventType, raw: Option<&RawEvent>) {
        let (x, y) = raw.map_or((f64::NAN, f64::NAN), RawEvent::position);
        self.0.borrow_mut().push(format!("{param}:{event}:{x},{y}"));
    }
}

#[test]
fn invoke_runs_the_attached_behavior() {
    let mut h = Harness::new(
        r#"{
            "regions": [{"name": "canvas", "w": 100, "h": 100}],
            "states": [{"name": "drawing", "transitions": [
                {"event": "move_inside", "region": "canvas",
                 "actions": [{"type": "invoke", "region": "canvas", "param": "stroke"}],
                 "next_state": "drawing"}
            ]}]
        }"#,
    );
    let log = Rc::new(RefCell::new(Vec::new()));
    let fsm = h.interactor.fsm_mut().unwrap();
    let id = fsm.find_region("canvas").unwrap();
    fsm.region_mut(id)
        .unwrap()
        .set_behavior(Some(Box::new(Recorder(Rc::clone(&log)))));

    h.interactor.set_position(10.0, 10.0);
    h.interactor.dispatch_raw_event(RawEventKind::Move, 30.0, 40.0).unwrap();
    assert_eq!(*log.borrow(), vec!["stroke:move_inside:20,30".to_string()]);
}
