//! `@member` operator for comment boxes
//!
//! Drives a host-owned user picker through [`MemberState`] flags instead of a
//! [`CompletionList`](super::CompletionList). The host renders the picker
//! from [`MemberOperator::state`] and calls [`MemberOperator::pick`] when a
//! user is chosen.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::data::{ExtraData, SignalData};
use super::handle::SignalHandle;
use super::operator::{SignalContext, SignalOperator, SignalOperatorDefinition};
use crate::editable::SignalGeometry;
use crate::keymap::Keystroke;

pub const MEMBER_KIND: &str = "member";
pub const MEMBER_SIGNAL: char = '@';

/// Token props of a mentioned user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUser {
    pub user_id: String,
    pub user_name: String,
}

/// What the host picker should display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberState {
    pub user_select_visible: bool,
    pub user_permission_tip_visible: bool,
    /// Keyword typed after `@`
    pub current_input_user_name: String,
    /// Caret geometry at session start
    pub current_range_position: SignalGeometry,
}

type AtMemberCallback = Box<dyn FnMut(&CommentUser)>;
type KeyStrokeCallback = Box<dyn FnMut(&SignalContext, &Keystroke) -> bool>;

struct MemberInner {
    state: MemberState,
    member_item_class: String,
    permission_manageable: bool,
    handle: Option<SignalHandle>,
    on_at_member: Option<AtMemberCallback>,
    on_key_stroke: Option<KeyStrokeCallback>,
}

impl MemberInner {
    fn close_picker(&mut self) {
        self.state.current_input_user_name.clear();
        self.state.user_select_visible = false;
        self.handle = None;
    }
}

/// Single-purpose operator for `@` mentions
#[derive(Clone)]
pub struct MemberOperator {
    inner: Rc<RefCell<MemberInner>>,
}

impl MemberOperator {
    /// `on_at_member` runs after a mention has been inserted
    pub fn new(member_item_class: impl Into<String>, on_at_member: impl FnMut(&CommentUser) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemberInner {
                state: MemberState::default(),
                member_item_class: member_item_class.into(),
                permission_manageable: false,
                handle: None,
                on_at_member: Some(Box::new(on_at_member)),
                on_key_stroke: None,
            })),
        }
    }

    /// Key handling while the picker is open (builder pattern)
    pub fn with_key_stroke(self, f: impl FnMut(&SignalContext, &Keystroke) -> bool + 'static) -> Self {
        self.inner.borrow_mut().on_key_stroke = Some(Box::new(f));
        self
    }

    /// Whether the current user may manage permissions; gates the
    /// permission tip shown after a mention
    pub fn set_permission_manageable(&self, manageable: bool) {
        self.inner.borrow_mut().permission_manageable = manageable;
    }

    pub fn hide_permission_tip(&self) {
        self.inner.borrow_mut().state.user_permission_tip_visible = false;
    }

    pub fn state(&self) -> MemberState {
        self.inner.borrow().state.clone()
    }

    /// Definition to register with the engine
    pub fn definition(&self) -> SignalOperatorDefinition {
        let class = self.inner.borrow().member_item_class.clone();
        SignalOperatorDefinition::new(MEMBER_KIND, MEMBER_SIGNAL, self.clone()).with_class(class)
    }

    /// Confirm the session with `user`
    pub fn pick(&self, user: &CommentUser) -> bool {
        self.resolve(user, None)
    }

    /// Confirm the session with `user` and extra data for the confirm hook
    pub fn pick_with(&self, user: &CommentUser, extra: ExtraData) -> bool {
        self.resolve(user, Some(extra))
    }

    /// Close the picker without mentioning anyone
    pub fn dismiss(&self) -> bool {
        match self.inner.borrow().handle.as_ref() {
            Some(handle) => handle.cancel(),
            None => false,
        }
    }

    fn resolve(&self, user: &CommentUser, extra: Option<ExtraData>) -> bool {
        let inner = self.inner.borrow();
        let Some(handle) = inner.handle.as_ref() else {
            tracing::warn!(user_id = %user.user_id, "member picked without an active session");
            return false;
        };
        let props = match serde_json::to_value(user) {
            Ok(props) => props,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize member props");
                return false;
            }
        };
        let data = SignalData::new(MEMBER_SIGNAL, MEMBER_KIND, format!("{}{}", MEMBER_SIGNAL, user.user_name))
            .with_props(props);
        match extra {
            Some(extra) => handle.confirm_with(data, extra),
            None => handle.confirm(data),
        }
    }
}

impl fmt::Debug for MemberOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemberOperator")
            .field("state", &inner.state)
            .field("permission_manageable", &inner.permission_manageable)
            .finish_non_exhaustive()
    }
}

impl SignalOperator for MemberOperator {
    fn on_signal_start(&mut self, ctx: &SignalContext, handle: SignalHandle) {
        let mut inner = self.inner.borrow_mut();
        inner.state.user_select_visible = true;
        inner.state.current_input_user_name.clear();
        inner.state.current_range_position = ctx.geometry;
        inner.handle = Some(handle);
    }

    fn on_signal_input(&mut self, _ctx: &SignalContext, keyword: &str) {
        self.inner.borrow_mut().state.current_input_user_name = keyword.to_string();
    }

    fn on_signal_cancel(&mut self, _ctx: &SignalContext) {
        self.inner.borrow_mut().close_picker();
    }

    fn on_signal_confirm(&mut self, _ctx: &SignalContext, data: &SignalData, _extra: Option<&ExtraData>) {
        let callback = {
            let mut inner = self.inner.borrow_mut();
            inner.close_picker();
            if inner.permission_manageable {
                inner.state.user_permission_tip_visible = true;
            }
            inner.on_at_member.take()
        };

        // The callback may call back into this operator
        let Some(mut callback) = callback else {
            return;
        };
        match data.props_as::<CommentUser>() {
            Ok(user) => callback(&user),
            Err(e) => tracing::warn!(error = %e, "member token without user props"),
        }
        self.inner.borrow_mut().on_at_member = Some(callback);
    }

    fn on_signal_key_stroke(&mut self, ctx: &SignalContext, stroke: &Keystroke) -> bool {
        let callback = self.inner.borrow_mut().on_key_stroke.take();
        let Some(mut callback) = callback else {
            return false;
        };
        let handled = callback(ctx, stroke);
        self.inner.borrow_mut().on_key_stroke = Some(callback);
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::KeyCode;
    use crate::signal::Resolution;

    fn ctx() -> SignalContext {
        SignalContext {
            signal: '@',
            kind: MEMBER_KIND.into(),
            geometry: SignalGeometry {
                top: 0.0,
                left: 20.0,
                width: 300.0,
                height: 80.0,
            },
            live_span: None,
            ignore_attribute: "data-signal-operator-ignore".into(),
        }
    }

    fn alice() -> CommentUser {
        CommentUser {
            user_id: "1".into(),
            user_name: "Alice".into(),
        }
    }

    #[test]
    fn test_picker_visibility_follows_session() {
        let mut op = MemberOperator::new("member-item", |_| {});
        op.on_signal_start(&ctx(), SignalHandle::new(1));
        let state = op.state();
        assert!(state.user_select_visible);
        assert_eq!(state.current_range_position.left, 20.0);

        op.on_signal_input(&ctx(), "Al");
        assert_eq!(op.state().current_input_user_name, "Al");

        op.on_signal_cancel(&ctx());
        assert_eq!(op.state(), MemberState {
            current_range_position: ctx().geometry,
            ..MemberState::default()
        });
    }

    #[test]
    fn test_pick_confirms_with_user_props() {
        let mut op = MemberOperator::new("member-item", |_| {});
        let handle = SignalHandle::new(1);
        op.on_signal_start(&ctx(), handle.clone());
        assert!(op.pick(&alice()));

        match handle.take() {
            Some(Resolution::Confirmed(data, None)) => {
                assert_eq!(data.content, "@Alice");
                assert_eq!(data.props_as::<CommentUser>().unwrap(), alice());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_confirm_runs_callback_and_permission_tip() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut op = MemberOperator::new("member-item", move |user: &CommentUser| {
            sink.borrow_mut().push(user.user_id.clone());
        });
        op.set_permission_manageable(true);

        let data = SignalData::new('@', MEMBER_KIND, "@Alice")
            .with_props(serde_json::to_value(alice()).unwrap());
        op.on_signal_confirm(&ctx(), &data, None);

        assert_eq!(*seen.borrow(), vec!["1".to_string()]);
        assert!(op.state().user_permission_tip_visible);
        op.hide_permission_tip();
        assert!(!op.state().user_permission_tip_visible);
    }

    #[test]
    fn test_permission_tip_requires_manageable() {
        let mut op = MemberOperator::new("member-item", |_| {});
        let data = SignalData::new('@', MEMBER_KIND, "@Alice")
            .with_props(serde_json::to_value(alice()).unwrap());
        op.on_signal_confirm(&ctx(), &data, None);
        assert!(!op.state().user_permission_tip_visible);
    }

    #[test]
    fn test_key_stroke_delegates() {
        let mut op = MemberOperator::new("member-item", |_| {})
            .with_key_stroke(|_, stroke| stroke.key == KeyCode::Down);
        assert!(op.on_signal_key_stroke(&ctx(), &Keystroke::key(KeyCode::Down)));
        assert!(!op.on_signal_key_stroke(&ctx(), &Keystroke::key(KeyCode::Left)));
    }

    #[test]
    fn test_definition() {
        let op = MemberOperator::new("member-item", |_| {});
        let def = op.definition();
        assert_eq!(def.kind(), "member");
        assert_eq!(def.signal(), '@');
        assert_eq!(def.dom_class(), Some("member-item"));
    }
}
