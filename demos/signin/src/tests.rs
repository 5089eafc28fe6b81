use proptest::prelude::*;
use tally_core::*;
use tally_platform::App;

use crate::{RootView, SignInState, sign_in_line};

fn mount() -> App {
    App::headless(RootView)
}

fn change(app: &mut App, value: &str) {
    let input = app.find_tag("text-input").unwrap();
    app.set_text(input, value).unwrap();
}

fn button_label(app: &mut App) -> String {
    let frame = app.frame().unwrap();
    frame
        .find_by_tag("count-button")
        .and_then(|n| n.label.clone())
        .unwrap()
}

fn signed_in(app: &mut App) -> bool {
    app.frame().unwrap().find_by_tag("welcome").is_some()
}

fn log_text(app: &mut App) -> String {
    let frame = app.frame().unwrap();
    frame.find_by_tag("log").and_then(|n| n.value.clone()).unwrap()
}

fn list_items(app: &mut App) -> Vec<String> {
    app.frame()
        .unwrap()
        .find_by_role(Role::ListItem)
        .filter_map(|n| n.label.clone())
        .collect()
}

fn list_keys(app: &mut App) -> Vec<String> {
    app.frame()
        .unwrap()
        .find_by_role(Role::ListItem)
        .filter_map(|n| n.key.clone())
        .collect()
}

/// One text-change event, dispatched the way the runner does it.
fn handle(state: &SignInState, value: &str) {
    batch(|| state.handle_text_change(value.to_string()));
}

#[test]
fn collected_values_follow_events_in_order() {
    let state = SignInState::new();
    let inputs: Vec<String> = (0..7).map(|i| format!("v{i}")).collect();
    for (n, v) in inputs.iter().enumerate() {
        handle(&state, v);
        assert_eq!(state.click_count.get(), n as u64 + 1);
        assert_eq!(state.collected.get().len(), n + 1);
    }
    assert_eq!(state.collected.get(), inputs);
    assert_eq!(state.text_value.get(), "v6");
}

#[test]
fn sign_in_toggles_on_first_fifth_and_ninth_events() {
    let state = SignInState::new();
    let seen: Vec<bool> = (0..10)
        .map(|i| {
            handle(&state, &i.to_string());
            state.signed_in.get()
        })
        .collect();
    assert_eq!(
        seen,
        [true, true, true, true, false, false, false, false, true, true]
    );
}

#[test]
fn increments_in_one_batch_compose() {
    let state = SignInState::new();
    batch(|| {
        state.increment_count();
        state.increment_count();
        state.increment_count();
    });
    assert_eq!(state.click_count.get(), 3);
}

#[test]
fn toggle_is_logical_negation() {
    let state = SignInState::new();
    state.toggle_signed_in();
    assert!(state.signed_in.get());
    batch(|| {
        state.toggle_signed_in();
        state.toggle_signed_in();
    });
    assert!(state.signed_in.get());
}

#[test]
fn list_is_visible_only_at_positive_multiples_of_ten() {
    let state = SignInState::new();
    assert!(state.visible_items().is_empty());
    for i in 0..20 {
        handle(&state, &format!("x{i}"));
        let n = state.click_count.get();
        let visible = state.visible_items();
        if n % 10 == 0 {
            assert_eq!(visible.len(), n as usize);
        } else {
            assert!(visible.is_empty(), "list shown at count {n}");
        }
    }
}

#[test]
fn mount_shows_initial_frame() {
    let mut app = mount();
    let scene = app.scene_text().unwrap();
    insta::assert_snapshot!(scene, @r"
    [ Clicked 0 ]
    > (type something)
    <img https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQSN5kyGXRsJTnCvfM371Ycg8u7k9viw1gW-g&s>
    list (empty)
    textarea
      | You are now not signed in
    ");
    assert_eq!(app.title(), "Clicked: 0");
}

#[test]
fn four_events_scenario() {
    let mut app = mount();
    for v in ["a", "b", "c", "d"] {
        change(&mut app, v);
    }
    assert_eq!(button_label(&mut app), "Clicked 4");
    assert_eq!(app.title(), "Clicked: 4");
    assert!(signed_in(&mut app));
    assert!(list_items(&mut app).is_empty());

    let scene = app.scene_text().unwrap();
    insta::assert_snapshot!(scene, @r"
    # Welcome Back
    [ Clicked 4 ]
    > d_
    <img https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQSN5kyGXRsJTnCvfM371Ycg8u7k9viw1gW-g&s>
    list (empty)
    textarea
      | You are now signed in
      | b
      | c
      | d
    ");
}

#[test]
fn ten_events_show_every_collected_value() {
    let mut app = mount();
    let inputs: Vec<String> = (0..10).map(|i| format!("item {i}")).collect();
    for (i, v) in inputs.iter().enumerate() {
        change(&mut app, v);
        if i < 9 {
            assert!(list_items(&mut app).is_empty());
        }
    }
    assert_eq!(button_label(&mut app), "Clicked 10");
    assert_eq!(list_items(&mut app), inputs);
    let keys: Vec<String> = (0..10).map(|i| format!("li-{i}")).collect();
    assert_eq!(list_keys(&mut app), keys);

    // one more event hides it again
    change(&mut app, "eleven");
    assert!(list_items(&mut app).is_empty());
}

#[test]
fn typing_sends_one_event_per_character() {
    let mut app = mount();
    let input = app.find_tag("text-input").unwrap();
    app.type_text(input, "abcdefghij").unwrap();
    assert_eq!(app.title(), "Clicked: 10");
    let items = list_items(&mut app);
    assert_eq!(items.len(), 10);
    assert_eq!(items[0], "a");
    assert_eq!(items[9], "abcdefghij");
}

#[test]
fn log_is_overwritten_on_toggle_then_appended() {
    let mut app = mount();
    assert_eq!(log_text(&mut app), sign_in_line(false));

    change(&mut app, "a");
    assert_eq!(log_text(&mut app), sign_in_line(true));
    change(&mut app, "b");
    change(&mut app, "c");
    assert_eq!(log_text(&mut app), "You are now signed in\nb\nc\n");
    change(&mut app, "d");
    change(&mut app, "e");
    assert_eq!(log_text(&mut app), sign_in_line(false));
    assert!(!signed_in(&mut app));
    change(&mut app, "f");
    assert_eq!(log_text(&mut app), "You are now not signed in\nf\n");
}

#[test]
fn log_overwrite_costs_one_extra_pass() {
    let mut app = mount();
    change(&mut app, "a");
    assert_eq!(app.frame().unwrap().passes, 2);
    change(&mut app, "b");
    assert_eq!(app.frame().unwrap().passes, 1);
}

#[test]
fn button_click_increments_count() {
    let mut app = mount();
    app.click_tag("count-button").unwrap();
    assert_eq!(button_label(&mut app), "Clicked 1");
    assert_eq!(app.title(), "Clicked: 1");

    // the modulo check sees the clicked count, so no toggle here
    change(&mut app, "a");
    assert!(!signed_in(&mut app));
    assert_eq!(button_label(&mut app), "Clicked 2");
}

#[test]
fn unmount_discards_all_state() {
    let mut app = mount();
    for v in ["a", "b", "c"] {
        change(&mut app, v);
    }
    app.unmount();
    assert_eq!(button_label(&mut app), "Clicked 0");
    assert_eq!(app.title(), "Clicked: 0");
    assert!(!signed_in(&mut app));
    assert_eq!(log_text(&mut app), sign_in_line(false));
}

#[test]
fn count_goes_past_u32_range() {
    let state = SignInState::new();
    state.click_count.set(u64::from(u32::MAX));
    state.increment_count();
    assert_eq!(state.click_count.get(), u64::from(u32::MAX) + 1);
}

proptest! {
    #[test]
    fn any_event_sequence_keeps_state_consistent(inputs in prop::collection::vec(".{0,6}", 0..40)) {
        let state = SignInState::new();
        for (n, v) in inputs.iter().enumerate() {
            handle(&state, v);
            prop_assert_eq!(state.click_count.get(), n as u64 + 1);
        }
        prop_assert_eq!(state.collected.get(), inputs.clone());

        // toggled on events 1, 5, 9, ...
        let toggles = inputs.len().div_ceil(4);
        prop_assert_eq!(state.signed_in.get(), toggles % 2 == 1);

        let n = inputs.len();
        let expected = if n > 0 && n % 10 == 0 { inputs } else { Vec::new() };
        prop_assert_eq!(state.visible_items(), expected);
    }
}
