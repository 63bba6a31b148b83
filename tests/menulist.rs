//! Menu-list and member operators driven through the engine

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{content, input, type_str};
use serde_json::json;
use sigil::config::SurfaceConfig;
use sigil::editable::MemorySurface;
use sigil::events::InputEvent;
use sigil::keymap::{KeyCode, Keystroke};
use sigil::signal::{
    signal_tokens, CommentUser, MemberOperator, MenuListOperator, RegisterOptions, RenderItem,
    SessionState, SignalEngine, StaticList,
};

fn mounted(initial: &str) -> SignalEngine<MemorySurface> {
    let config = SurfaceConfig {
        default_content: initial.to_string(),
        ..SurfaceConfig::default()
    };
    let mut engine = SignalEngine::new(config);
    engine.mount(MemorySurface::default()).unwrap();
    engine.surface_mut().unwrap().content.collapse_to_end();
    engine
}

fn member_menu(engine: &mut SignalEngine<MemorySurface>) -> MenuListOperator<StaticList> {
    let options = RegisterOptions::new(
        "member",
        '@',
        vec![RenderItem::new("1", "Alice"), RenderItem::new("2", "Bob")],
        |item| json!({ "user_id": item.value }),
    )
    .with_class("mention");
    let menu = MenuListOperator::new(options, StaticList::default());
    engine.register_signal_operator(menu.definition()).unwrap();
    menu
}

fn press(engine: &mut SignalEngine<MemorySurface>, key: KeyCode) -> bool {
    let cmd = engine.on_key_stroke(Keystroke::key(key)).unwrap();
    let prevented = cmd.as_ref().is_some_and(|c| c.prevents_default());
    if let Some(cmd) = cmd {
        engine.run_cmd(&cmd);
    }
    prevented
}

// ============================================================================
// MenuListOperator
// ============================================================================

#[test]
fn test_list_follows_session() {
    let mut engine = mounted("Hi ");
    let menu = member_menu(&mut engine);

    type_str(&mut engine, "@Al");
    assert!(menu.is_inputting());
    assert_eq!(menu.query(), "Al");
    menu.with_list(|list| {
        assert!(list.visible);
        assert_eq!(list.query, "Al");
        assert_eq!(list.ignore_attribute, "data-signal-operator-ignore");
    });

    type_str(&mut engine, " ");
    assert!(!menu.is_inputting());
    menu.with_list(|list| assert!(!list.visible));
}

#[test]
fn test_list_positioned_below_trigger() {
    let mut engine = mounted("");
    let menu = member_menu(&mut engine);
    input(&mut engine, InputEvent::line_break());
    type_str(&mut engine, "ab@");

    // MemorySurface: 20px lines, 10px columns
    menu.with_list(|list| {
        assert_eq!(list.geometry.top, 20.0 + 24.0);
        assert_eq!(list.geometry.left, 30.0);
        assert_eq!(list.geometry.width, 400.0);
    });
}

#[test]
fn test_click_on_item_confirms() {
    let mut engine = mounted("Hi ");
    let menu = member_menu(&mut engine);
    type_str(&mut engine, "@Al");

    // Clicking the list is an outside interaction on an ignored target
    engine.on_blur_outside(true).unwrap();
    assert!(menu.select(&RenderItem::new("1", "Alice")));
    let cmd = engine.settle().unwrap().unwrap();
    engine.run_cmd(&cmd);

    assert_eq!(
        engine.get_content(),
        r#"Hi <span contenteditable="false" class="mention" data-signal="@" data-signal-type="member" data-signal-props='{"user_id":"1"}'>@Alice</span>"#
    );
    assert_eq!(engine.session_state(), SessionState::Idle);
    assert!(!menu.is_inputting());
}

#[test]
fn test_keyboard_selection() {
    let mut engine = mounted("");
    let menu = member_menu(&mut engine);
    type_str(&mut engine, "@");

    assert!(press(&mut engine, KeyCode::Down));
    assert!(press(&mut engine, KeyCode::Down));
    assert!(press(&mut engine, KeyCode::Up));
    menu.with_list(|list| assert_eq!(list.highlighted, 1));

    assert!(press(&mut engine, KeyCode::Enter));
    let tokens = signal_tokens(content(&engine));
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].content, "@Bob");
    assert_eq!(tokens[0].props, json!({"user_id": "2"}));

    // Caret after the token, typing continues there
    type_str(&mut engine, "!");
    assert_eq!(content(&engine).plain_text(), "@Bob!");
}

#[test]
fn test_escape_dismisses_without_mutation() {
    let mut engine = mounted("x ");
    let menu = member_menu(&mut engine);
    type_str(&mut engine, "@Bo");

    assert!(press(&mut engine, KeyCode::Escape));
    assert_eq!(engine.session_state(), SessionState::Idle);
    assert_eq!(content(&engine).plain_text(), "x @Bo");
    menu.with_list(|list| assert!(!list.visible));

    // Not intercepted any more
    assert!(!press(&mut engine, KeyCode::Down));
}

#[test]
fn test_enter_with_empty_list_not_suppressed() {
    let mut engine = mounted("");
    let options = RegisterOptions::new("topic", '#', vec![], |_| json!({}));
    let menu = MenuListOperator::new(options, StaticList::default());
    engine.register_signal_operator(menu.definition()).unwrap();

    type_str(&mut engine, "#");
    assert!(!press(&mut engine, KeyCode::Enter));
    assert!(engine.session_state().is_active());
}

#[test]
fn test_two_menus_share_one_surface() {
    let mut engine = mounted("");
    let members = member_menu(&mut engine);
    let topics = MenuListOperator::new(
        RegisterOptions::new("topic", '#', vec![RenderItem::new("9", "news")], |item| {
            json!({ "topic_id": item.value })
        }),
        StaticList::default(),
    );
    engine.register_signal_operator(topics.definition()).unwrap();

    type_str(&mut engine, "@A");
    type_str(&mut engine, "#");
    assert!(!members.is_inputting());
    assert!(topics.is_inputting());

    assert!(topics.select_highlighted());
    engine.settle().unwrap();
    assert_eq!(signal_tokens(content(&engine))[0].kind, "topic");
    assert_eq!(content(&engine).plain_text(), "@A#news");
}

// ============================================================================
// MemberOperator
// ============================================================================

fn member(engine: &mut SignalEngine<MemorySurface>) -> (MemberOperator, Rc<RefCell<Vec<CommentUser>>>) {
    let mentioned = Rc::new(RefCell::new(Vec::new()));
    let sink = mentioned.clone();
    let op = MemberOperator::new("member-item", move |user: &CommentUser| {
        sink.borrow_mut().push(user.clone())
    });
    engine.register_signal_operator(op.definition()).unwrap();
    (op, mentioned)
}

#[test]
fn test_member_pick_flow() {
    let mut engine = mounted("Thanks ");
    let (op, mentioned) = member(&mut engine);
    op.set_permission_manageable(true);

    type_str(&mut engine, "@Ali");
    let state = op.state();
    assert!(state.user_select_visible);
    assert_eq!(state.current_input_user_name, "Ali");

    let alice = CommentUser {
        user_id: "1".into(),
        user_name: "Alice".into(),
    };
    engine.on_blur_outside(true).unwrap();
    assert!(op.pick(&alice));
    engine.settle().unwrap();

    assert_eq!(*mentioned.borrow(), vec![alice.clone()]);
    let state = op.state();
    assert!(!state.user_select_visible);
    assert!(state.user_permission_tip_visible);

    let tokens = signal_tokens(content(&engine));
    assert_eq!(tokens[0].props_as::<CommentUser>().unwrap(), alice);
    assert_eq!(tokens[0].dom_class.as_deref(), Some("member-item"));
}

#[test]
fn test_member_dismiss() {
    let mut engine = mounted("");
    let (op, mentioned) = member(&mut engine);
    type_str(&mut engine, "@x");
    assert!(op.dismiss());
    engine.settle().unwrap();

    assert_eq!(engine.session_state(), SessionState::Idle);
    assert!(!op.state().user_select_visible);
    assert!(mentioned.borrow().is_empty());
    assert!(!op.dismiss());
}
