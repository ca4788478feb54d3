//! End-to-end widget behaviour driven through host events.

use input_core::{Boundary, Selection, SurfaceNode, TriggerPlaceholder};
use mentions::{
    DropdownEvent, EditorEvent, EditorKind, EventKind, FetchError, FetchFuture, FixedLayout, InputKind, Key,
    ListenerTarget, MentionOption, Mentions, MentionsConfig, MentionsConfigBuilder, MentionsEvent,
    Outcome, RenderInstruction, SetError, SetKey,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn records() -> Vec<Value> {
    vec![
        json!({"label": "Alice", "value": "1"}),
        json!({"label": "Bob", "value": "2"}),
        json!({"label": "Carol", "value": "3", "disabled": true}),
    ]
}

fn widget(builder: MentionsConfigBuilder) -> Mentions {
    let mut w = Mentions::new(builder.build().unwrap());
    assert!(w.mount(Box::new(FixedLayout::default())));
    w
}

fn with_options() -> Mentions {
    widget(MentionsConfig::builder().options(records()))
}

fn type_text(w: &mut Mentions, s: &str) {
    for c in s.chars() {
        w.handle_event(EditorEvent::BeforeInput {
            kind: InputKind::InsertText,
            data: Some(c.to_string()),
        });
    }
}

fn input(w: &mut Mentions, kind: InputKind, data: &str) {
    w.handle_event(EditorEvent::BeforeInput {
        kind,
        data: Some(data.to_string()),
    });
}

fn key(w: &mut Mentions, k: Key) {
    w.handle_event(EditorEvent::KeyDown(k));
}

fn record(w: &mut Mentions, kind: EventKind) -> Rc<RefCell<Vec<MentionsEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    w.on(kind, move |e| sink.borrow_mut().push(e.clone()));
    seen
}

fn token_count(w: &Mentions) -> usize {
    w.surface().mentions().count()
}

#[test]
fn typing_trigger_opens_dropdown_with_caret_after_placeholder() {
    let mut w = with_options();
    let opened = record(&mut w, EventKind::Open);
    type_text(&mut w, "@");

    assert!(w.is_open());
    assert_eq!(
        w.surface().nodes(),
        &[SurfaceNode::Trigger(TriggerPlaceholder::new('@'))]
    );
    assert_eq!(w.surface().selection(), Selection::collapsed(Boundary::child(0, 1)));
    assert_eq!(w.surface().caret_offset(), 1);
    assert_eq!(opened.borrow().len(), 1);
    assert_eq!(w.listeners().count(ListenerTarget::Dropdown), 2);
    assert_eq!(w.listeners().count(ListenerTarget::Document), 2);
    assert_eq!(w.listeners().count(ListenerTarget::Observer), 1);
}

#[test]
fn trigger_can_reopen_after_cancel() {
    let mut w = with_options();
    type_text(&mut w, "@");
    key(&mut w, Key::ArrowLeft);
    assert!(!w.is_open());
    assert!(w.surface().trigger().is_none());
    type_text(&mut w, "@");
    assert!(w.is_open());
    assert_eq!(w.surface().nodes().iter().filter(|n| matches!(n, SurfaceNode::Trigger(_))).count(), 1);
}

#[test]
fn filter_typing_is_mirrored_into_placeholder() {
    let mut w = with_options();
    type_text(&mut w, "hi @al");
    assert_eq!(w.dropdown().filter, "al");
    assert_eq!(w.surface().trigger().map(|t| t.text.as_str()), Some("@al"));
    assert_eq!(w.current_options(), vec![MentionOption::new("Alice", "1")]);
    assert_eq!(w.value(), "hi @al");

    input(&mut w, InputKind::DeleteContentBackward, "");
    assert_eq!(w.dropdown().filter, "a");
    assert_eq!(w.surface().trigger().map(|t| t.text.as_str()), Some("@a"));
}

#[test]
fn enter_submits_highlighted_option_once() {
    let mut w = with_options();
    let closed = record(&mut w, EventKind::Close);
    let changes = record(&mut w, EventKind::Change);
    let mentions_changes = record(&mut w, EventKind::MentionsChange);
    type_text(&mut w, "hi @");
    key(&mut w, Key::ArrowDown);
    key(&mut w, Key::Enter);

    assert!(!w.is_open());
    assert_eq!(token_count(&w), 1);
    assert!(w.surface().trigger().is_none());
    assert_eq!(w.value(), "hi #{name:Alice,id:1}");
    assert_eq!(w.mentions(), &[MentionOption::new("Alice", "1")]);
    assert_eq!(closed.borrow().len(), 1);
    assert_eq!(
        changes.borrow().last(),
        Some(&MentionsEvent::Change {
            value: "hi #{name:Alice,id:1}".into(),
            previous: "hi @".into(),
        })
    );
    assert_eq!(
        mentions_changes.borrow().as_slice(),
        &[MentionsEvent::MentionsChange {
            mentions: vec![MentionOption::new("Alice", "1")],
            previous: vec![],
        }]
    );
    assert_eq!(w.surface().caret_offset(), w.surface().total_units());
}

#[test]
fn press_in_single_mode_inserts_that_option() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.handle_dropdown_event(DropdownEvent::OptionPress(1));
    assert!(!w.is_open());
    assert_eq!(w.value(), "#{name:Bob,id:2}");
    assert_eq!(
        w.surface().to_markup(),
        "<em class=\"mentions__mention\" contenteditable=\"false\" data-id=\"2\" data-name=\"Bob\">@Bob </em>"
    );
}

#[test]
fn multiple_mode_inserts_all_picks_in_list_order() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.handle_dropdown_event(DropdownEvent::MultipleButton);
    w.handle_dropdown_event(DropdownEvent::OptionPress(1));
    w.handle_dropdown_event(DropdownEvent::OptionPress(0));
    assert!(w.is_open());
    w.handle_dropdown_event(DropdownEvent::MultipleButton);

    assert!(!w.is_open());
    assert_eq!(w.value(), "#{name:Alice,id:1}#{name:Bob,id:2}");
    assert_eq!(token_count(&w), 2);
}

#[test]
fn disabled_option_cannot_be_inserted() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.handle_dropdown_event(DropdownEvent::OptionPress(2));
    assert!(w.is_open());
    assert_eq!(token_count(&w), 0);
}

#[test]
fn backspace_on_empty_filter_deletes_trigger() {
    let mut w = with_options();
    type_text(&mut w, "x@");
    input(&mut w, InputKind::DeleteContentBackward, "");
    assert!(!w.is_open());
    assert_eq!(w.surface().nodes(), &[SurfaceNode::text("x")]);
    assert_eq!(w.value(), "x");
}

#[test]
fn caret_keys_cancel_and_fold_placeholder() {
    let mut w = with_options();
    type_text(&mut w, "a@bo");
    key(&mut w, Key::ArrowLeft);
    assert!(!w.is_open());
    assert_eq!(w.surface().nodes(), &[SurfaceNode::text("a@bo")]);
    assert_eq!(w.value(), "a@bo");
    assert_eq!(w.surface().caret_offset(), 4);
}

#[test]
fn editor_click_closes_without_moving_caret() {
    let mut w = with_options();
    type_text(&mut w, "ab@x");
    w.handle_event(EditorEvent::MouseDown);
    w.handle_event(EditorEvent::MouseUp(Selection::collapsed(Boundary::child(0, 1))));
    w.handle_event(EditorEvent::Click);

    assert!(!w.is_open());
    assert_eq!(w.surface().nodes(), &[SurfaceNode::text("ab@x")]);
    assert_eq!(w.surface().caret_offset(), 1);
}

#[test]
fn outside_click_closes() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.handle_dropdown_event(DropdownEvent::OutsideClick);
    assert!(!w.is_open());
    assert_eq!(w.value(), "@");
}

#[test]
fn oversized_mention_is_not_inserted() {
    let mut w = widget(MentionsConfig::builder().options(records()).max_length(5));
    type_text(&mut w, "@");
    assert!(w.is_open());
    w.handle_dropdown_event(DropdownEvent::OptionPress(0));

    assert!(!w.is_open());
    assert_eq!(token_count(&w), 0);
    assert_eq!(w.value(), "");
}

#[test]
fn paste_over_max_length_is_rejected() {
    let mut w = widget(MentionsConfig::builder().max_length(5));
    let changes = record(&mut w, EventKind::Change);
    type_text(&mut w, "abc");
    input(&mut w, InputKind::InsertFromPaste, "defg");
    assert_eq!(w.value(), "abc");
    input(&mut w, InputKind::InsertFromPaste, "de");
    assert_eq!(w.value(), "abcde");
    type_text(&mut w, "f");
    assert_eq!(w.value(), "abcde");
    assert_eq!(changes.borrow().len(), 4);
}

#[test]
fn edit_over_limit_after_insertion_is_rolled_back() {
    let mut w = widget(
        MentionsConfig::builder()
            .value("#{name:A,id:1")
            .max_length(14)
            .get_mention_length(|_| 100),
    );
    let changes = record(&mut w, EventKind::Change);
    let before = w.surface().clone();
    type_text(&mut w, "}");

    assert_eq!(w.value(), "#{name:A,id:1");
    assert_eq!(w.surface().nodes(), before.nodes());
    assert!(changes.borrow().is_empty());
}

#[test]
fn mount_destroy_and_show_hide_leave_no_listeners() {
    let mut w = with_options();
    assert_eq!(w.listeners().count(ListenerTarget::Surface), 9);
    assert!(!w.mount(Box::new(FixedLayout::default())));
    assert_eq!(w.listeners().count(ListenerTarget::Surface), 9);

    type_text(&mut w, "@");
    key(&mut w, Key::Escape);
    assert_eq!(w.listeners().count(ListenerTarget::Dropdown), 0);
    assert_eq!(w.listeners().count(ListenerTarget::Document), 0);
    assert_eq!(w.listeners().count(ListenerTarget::Observer), 0);

    type_text(&mut w, "@");
    w.destroy();
    assert_eq!(w.listeners().total(), 0);
    assert!(!w.is_open());

    for _ in 0..3 {
        assert!(w.mount(Box::new(FixedLayout::default())));
        w.destroy();
    }
    assert_eq!(w.listeners().total(), 0);
}

#[test]
fn mouse_press_listener_is_scoped_to_the_press() {
    let mut w = with_options();
    w.handle_event(EditorEvent::MouseDown);
    assert_eq!(w.listeners().count(ListenerTarget::Document), 1);
    w.handle_event(EditorEvent::MouseUp(Selection::default()));
    assert_eq!(w.listeners().count(ListenerTarget::Document), 0);
    assert_eq!(
        w.handle_event(EditorEvent::MouseUp(Selection::default())),
        Outcome::IGNORED
    );
}

#[test]
fn events_before_mount_are_ignored() {
    let mut w = Mentions::new(MentionsConfig::builder().options(records()).build().unwrap());
    type_text(&mut w, "@");
    assert!(!w.is_open());
    assert_eq!(w.value(), "");
}

#[test]
fn pointer_selection_never_lands_inside_a_token() {
    let mut w = widget(MentionsConfig::builder().value("a#{name:B,id:2}c"));
    w.handle_event(EditorEvent::MouseDown);
    w.handle_event(EditorEvent::MouseUp(Selection::collapsed(Boundary::child(1, 0))));
    assert_eq!(w.surface().selected_range(), (1, 2));

    w.handle_event(EditorEvent::MouseDown);
    w.handle_event(EditorEvent::MouseUp(Selection::new(
        Boundary::child(1, 1),
        Boundary::child(0, 0),
    )));
    assert_eq!(w.surface().selected_range(), (0, 2));
}

fn counting_fetch(builder: MentionsConfigBuilder, calls: Rc<Cell<usize>>, fail: bool) -> MentionsConfigBuilder {
    builder.options_fetch_api(move || {
        calls.set(calls.get() + 1);
        let fut: FetchFuture = Box::pin(async move {
            if fail {
                Err(FetchError::Failed("offline".into()))
            } else {
                Ok(vec![
                    json!({"label": "Remote", "value": "r1"}),
                    json!({"label": "Other", "value": "r2"}),
                ])
            }
        });
        fut
    })
}

fn settle(w: &mut Mentions) -> Result<(), FetchError> {
    let fut = w.take_pending_fetch().expect("fetch in flight");
    let result = pollster::block_on(fut);
    w.finish_fetch(result)
}

#[test]
fn remote_options_are_fetched_once_per_lifetime() {
    let calls = Rc::new(Cell::new(0));
    let mut w = widget(counting_fetch(MentionsConfig::builder(), Rc::clone(&calls), false));

    type_text(&mut w, "@");
    assert!(w.dropdown().loading);
    settle(&mut w).unwrap();
    assert!(!w.dropdown().loading);
    assert_eq!(w.current_options().len(), 2);

    key(&mut w, Key::Escape);
    type_text(&mut w, " @");
    assert!(w.is_open());
    assert!(w.take_pending_fetch().is_none());
    assert_eq!(calls.get(), 1);
    assert_eq!(w.fetch_calls(), 1);
    assert_eq!(w.current_options().len(), 2);
}

#[test]
fn fetch_resolving_after_close_is_cached_silently() {
    let calls = Rc::new(Cell::new(0));
    let mut w = widget(counting_fetch(MentionsConfig::builder(), Rc::clone(&calls), false));
    type_text(&mut w, "@");
    key(&mut w, Key::Escape);
    w.take_render_instructions();

    settle(&mut w).unwrap();
    let after = w.take_render_instructions();
    assert!(!after.iter().any(|i| matches!(
        i,
        RenderInstruction::DropdownUpdate(_) | RenderInstruction::DropdownPosition(_)
    )));

    type_text(&mut w, "@");
    assert_eq!(calls.get(), 1);
    assert_eq!(w.current_options().len(), 2);
}

#[test]
fn failed_fetch_is_reported_and_retried_on_next_open() {
    let calls = Rc::new(Cell::new(0));
    let mut w = widget(counting_fetch(MentionsConfig::builder(), Rc::clone(&calls), true));
    type_text(&mut w, "@");
    assert_eq!(settle(&mut w), Err(FetchError::Failed("offline".into())));
    assert!(!w.dropdown().loading);
    assert!(w.current_options().is_empty());

    key(&mut w, Key::Escape);
    type_text(&mut w, "@");
    assert_eq!(calls.get(), 2);
    assert_eq!(w.finish_fetch(Ok(vec![])), Ok(()));
    assert_eq!(w.finish_fetch(Ok(vec![])), Err(FetchError::NotInFlight));
}

#[test]
fn immediate_mode_fetches_at_construction() {
    let calls = Rc::new(Cell::new(0));
    let cfg = counting_fetch(MentionsConfig::builder().immediate(true), Rc::clone(&calls), false)
        .build()
        .unwrap();
    let mut w = Mentions::new(cfg);
    assert_eq!(calls.get(), 1);
    settle(&mut w).unwrap();

    w.mount(Box::new(FixedLayout::default()));
    type_text(&mut w, "@");
    assert_eq!(calls.get(), 1);
    assert_eq!(w.current_options().len(), 2);
}

#[test]
fn set_value_replaces_content_without_change_event() {
    let mut w = with_options();
    let changes = record(&mut w, EventKind::Change);
    let mentions_changes = record(&mut w, EventKind::MentionsChange);
    w.set(SetKey::Value, json!("x #{name:A,id:1}")).unwrap();

    assert_eq!(w.value(), "x #{name:A,id:1}");
    assert_eq!(token_count(&w), 1);
    assert!(changes.borrow().is_empty());
    assert_eq!(mentions_changes.borrow().len(), 1);
}

#[test]
fn set_rejects_wrong_types_and_unknown_keys() {
    let mut w = with_options();
    assert_eq!(
        w.set(SetKey::MaxLength, json!("ten")),
        Err(SetError::WrongType {
            key: "max-length",
            expected: "a non-negative integer",
        })
    );
    assert_eq!(
        "placeholder".parse::<SetKey>(),
        Err(SetError::UnknownKey("placeholder".into()))
    );
    assert_eq!("max-length".parse::<SetKey>(), Ok(SetKey::MaxLength));
}

#[test]
fn set_options_replaces_candidates() {
    let mut w = with_options();
    w.set(SetKey::Options, json!([{"label": "Zed", "value": "z"}])).unwrap();
    type_text(&mut w, "@");
    assert_eq!(w.current_options(), vec![MentionOption::new("Zed", "z")]);
}

#[test]
fn set_max_length_applies_to_later_edits() {
    let mut w = with_options();
    w.set(SetKey::MaxLength, json!(2)).unwrap();
    type_text(&mut w, "abc");
    assert_eq!(w.value(), "ab");
}

#[test]
fn disabled_and_readonly_block_editing() {
    let mut w = with_options();
    w.set(SetKey::Disabled, json!(true)).unwrap();
    type_text(&mut w, "a@");
    assert_eq!(w.value(), "");
    assert!(!w.is_open());
    assert!(w.take_render_instructions().contains(&RenderInstruction::Disabled(true)));

    w.set(SetKey::Disabled, json!(false)).unwrap();
    w.set(SetKey::Readonly, json!(true)).unwrap();
    type_text(&mut w, "a");
    assert_eq!(w.value(), "");

    w.set(SetKey::Readonly, json!(false)).unwrap();
    type_text(&mut w, "a");
    assert_eq!(w.value(), "a");
}

#[test]
fn disabling_closes_open_dropdown() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.set(SetKey::Disabled, json!(true)).unwrap();
    assert!(!w.is_open());
    assert_eq!(w.listeners().count(ListenerTarget::Document), 0);
}

#[test]
fn subscription_surface() {
    let mut w = with_options();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let id = w.on(EventKind::Change, move |_| h.set(h.get() + 1));
    let h = Rc::clone(&hits);
    w.once(EventKind::Change, move |_| h.set(h.get() + 10));

    type_text(&mut w, "a");
    type_text(&mut w, "b");
    assert_eq!(hits.get(), 12);

    assert!(w.off(id));
    type_text(&mut w, "c");
    assert_eq!(hits.get(), 12);

    w.on(EventKind::Open, |_| {});
    w.clear();
    assert_eq!(w.subscriber_count(EventKind::Open), 0);
}

#[test]
fn enter_inserts_line_break_only_in_textarea() {
    let mut w = widget(MentionsConfig::builder().kind(EditorKind::Textarea));
    type_text(&mut w, "a");
    key(&mut w, Key::Enter);
    type_text(&mut w, "b");
    assert_eq!(w.value(), "a\nb");
    assert_eq!(w.surface().to_markup(), "a<br>b");

    let mut w = with_options();
    type_text(&mut w, "a");
    key(&mut w, Key::Enter);
    input(&mut w, InputKind::InsertLineBreak, "");
    assert_eq!(w.value(), "a");
}

#[test]
fn paste_keeps_newlines_only_in_textarea() {
    let mut w = widget(MentionsConfig::builder().kind(EditorKind::Textarea));
    input(&mut w, InputKind::InsertFromPaste, "x\r\ny");
    assert_eq!(w.value(), "x\ny");

    let mut w = with_options();
    input(&mut w, InputKind::InsertFromPaste, "x\r\ny");
    assert_eq!(w.value(), "xy");
}

#[test]
fn composition_commits_on_end() {
    let mut w = with_options();
    w.handle_event(EditorEvent::CompositionStart);
    input(&mut w, InputKind::InsertCompositionText, "ni");
    assert_eq!(w.value(), "");
    w.handle_event(EditorEvent::CompositionEnd("你".into()));
    assert_eq!(w.value(), "你");
}

#[test]
fn statistics_follow_mentions() {
    let mut w = widget(
        MentionsConfig::builder()
            .options(records())
            .show_statistics(|m| format!("{} mention(s)", m.len())),
    );
    assert!(
        w.take_render_instructions()
            .contains(&RenderInstruction::Statistics("0 mention(s)".into()))
    );
    type_text(&mut w, "@");
    w.handle_dropdown_event(DropdownEvent::OptionPress(0));
    assert!(
        w.take_render_instructions()
            .contains(&RenderInstruction::Statistics("1 mention(s)".into()))
    );
}

#[test]
fn open_positions_panel_under_trigger() {
    let mut w = with_options();
    w.take_render_instructions();
    type_text(&mut w, "@");
    let geometry = w.take_render_instructions().into_iter().find_map(|i| match i {
        RenderInstruction::DropdownPosition(g) => Some(g),
        _ => None,
    });
    let g = geometry.expect("position instruction");
    assert_eq!((g.left, g.top), (0.0, 20.0));
    assert_eq!((g.width, g.height), (240.0, 200.0));
    assert_eq!(g.max_height, 200.0);
}

#[test]
fn keyboard_navigation_scrolls_active_option_into_view() {
    let mut w = with_options();
    type_text(&mut w, "@");
    w.take_render_instructions();
    key(&mut w, Key::ArrowDown);
    key(&mut w, Key::ArrowDown);
    let out = w.take_render_instructions();
    assert!(out.contains(&RenderInstruction::ScrollIntoView(1)));

    w.handle_dropdown_event(DropdownEvent::OptionHover(0));
    assert!(!w.take_render_instructions().iter().any(|i| matches!(i, RenderInstruction::ScrollIntoView(_))));
}

#[test]
fn deleting_still_works_when_content_is_over_the_limit() {
    let mut w = widget(MentionsConfig::builder().value("abcdef"));
    w.set(SetKey::MaxLength, json!(3)).unwrap();

    input(&mut w, InputKind::DeleteContentBackward, "");
    assert_eq!(w.value(), "abcde");
    type_text(&mut w, "x");
    assert_eq!(w.value(), "abcde");
    input(&mut w, InputKind::DeleteContentBackward, "");
    input(&mut w, InputKind::DeleteContentBackward, "");
    assert_eq!(w.value(), "abc");
}

#[test]
fn typing_over_a_selection_at_the_limit_replaces_it() {
    let mut w = widget(MentionsConfig::builder().max_length(5));
    type_text(&mut w, "abcde");
    w.handle_event(EditorEvent::SelectionChange(Selection::new(
        Boundary::child(0, 1),
        Boundary::child(0, 3),
    )));
    type_text(&mut w, "x");
    assert_eq!(w.value(), "axde");
    type_text(&mut w, "yz");
    assert_eq!(w.value(), "axyde");
}

#[test]
fn destroy_abandons_uncollected_fetch() {
    let calls = Rc::new(Cell::new(0));
    let mut w = widget(counting_fetch(MentionsConfig::builder(), Rc::clone(&calls), false));
    type_text(&mut w, "@");
    assert!(w.dropdown().loading);
    w.destroy();

    assert!(!w.dropdown().loading);
    assert!(w.take_pending_fetch().is_none());
    assert_eq!(w.finish_fetch(Ok(vec![])), Err(FetchError::NotInFlight));

    assert!(w.mount(Box::new(FixedLayout::default())));
    type_text(&mut w, "@");
    assert_eq!(calls.get(), 2);
    assert!(w.dropdown().loading);
    settle(&mut w).unwrap();
    assert!(!w.dropdown().loading);
    assert_eq!(w.current_options().len(), 2);
}
