//! Generic completion-list operator
//!
//! [`MenuListOperator`] turns a candidate list and a props generator into a
//! full [`SignalOperator`]: it shows a [`CompletionList`] when a session
//! starts, feeds it the keyword, maps arrow keys to list navigation and
//! confirms the session with the selected item.
//!
//! The operator is a cheap shared handle. One clone is registered with the
//! engine, the host keeps another to forward list clicks through
//! [`MenuListOperator::select`] (followed by `SignalEngine::settle`).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::data::{ExtraData, SignalData};
use super::handle::SignalHandle;
use super::operator::{SignalContext, SignalOperator, SignalOperatorDefinition};
use crate::editable::SignalGeometry;
use crate::keymap::{KeyCode, Keystroke};

/// Vertical distance between the caret and the list
pub const MENU_OFFSET_Y: f32 = 24.0;

/// One candidate of a completion list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub value: String,
    pub label: String,
    /// Any other fields, available to the props generator
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            extra: Map::new(),
        }
    }
}

/// Options of a menu-list operator
pub struct RegisterOptions {
    /// Operator type name
    pub kind: String,
    /// Trigger character
    pub signal: char,
    /// CSS class of inserted tokens
    pub signal_class: Option<String>,
    /// Candidates shown by the list
    pub render_list: Vec<RenderItem>,
    /// Builds the token props for a selected item
    pub generate_props: Box<dyn Fn(&RenderItem) -> Value>,
}

impl RegisterOptions {
    pub fn new(
        kind: impl Into<String>,
        signal: char,
        render_list: Vec<RenderItem>,
        generate_props: impl Fn(&RenderItem) -> Value + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            signal,
            signal_class: None,
            render_list,
            generate_props: Box::new(generate_props),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.signal_class = Some(class.into());
        self
    }
}

impl fmt::Debug for RegisterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterOptions")
            .field("kind", &self.kind)
            .field("signal", &self.signal)
            .field("signal_class", &self.signal_class)
            .field("render_list", &self.render_list)
            .finish_non_exhaustive()
    }
}

/// The visual completion list collaborator.
///
/// Filtering and ranking are the list's business; the operator only passes
/// the keyword along.
pub trait CompletionList {
    /// Show `items` next to the caret. The list's root element must carry
    /// `ignore_attribute` so clicks on it keep the session alive.
    fn show(&mut self, kind: &str, items: &[RenderItem], geometry: SignalGeometry, ignore_attribute: &str);

    /// Current keyword typed after the trigger
    fn set_query(&mut self, query: &str);

    /// Move the highlight down
    fn next(&mut self);

    /// Move the highlight up
    fn prev(&mut self);

    /// Item the highlight is on
    fn highlighted(&self) -> Option<RenderItem>;

    fn hide(&mut self);

    fn is_visible(&self) -> bool;
}

/// In-memory list with wrap-around highlight and no filtering
#[derive(Debug, Clone, Default)]
pub struct StaticList {
    pub items: Vec<RenderItem>,
    pub query: String,
    pub highlighted: usize,
    pub visible: bool,
    pub geometry: SignalGeometry,
    pub ignore_attribute: String,
}

impl CompletionList for StaticList {
    fn show(&mut self, _kind: &str, items: &[RenderItem], geometry: SignalGeometry, ignore_attribute: &str) {
        self.items = items.to_vec();
        self.query.clear();
        self.highlighted = 0;
        self.visible = true;
        self.geometry = geometry;
        self.ignore_attribute = ignore_attribute.to_string();
    }

    fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    fn next(&mut self) {
        if !self.items.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.items.len();
        }
    }

    fn prev(&mut self) {
        if !self.items.is_empty() {
            self.highlighted = (self.highlighted + self.items.len() - 1) % self.items.len();
        }
    }

    fn highlighted(&self) -> Option<RenderItem> {
        self.items.get(self.highlighted).cloned()
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

struct MenuListState<L> {
    options: RegisterOptions,
    list: L,
    handle: Option<SignalHandle>,
    query: String,
    inputting: bool,
}

impl<L: CompletionList> MenuListState<L> {
    fn select(&mut self, item: &RenderItem) -> bool {
        let Some(handle) = self.handle.as_ref() else {
            tracing::warn!(kind = %self.options.kind, "item selected without an active session");
            return false;
        };
        let props = (self.options.generate_props)(item);
        let data = SignalData::new(
            self.options.signal,
            self.options.kind.as_str(),
            format!("{}{}", self.options.signal, item.label),
        )
        .with_props(props);
        handle.confirm(data)
    }

    fn reset(&mut self) {
        self.handle = None;
        self.query.clear();
        self.inputting = false;
        self.list.hide();
    }
}

/// Operator backed by a [`CompletionList`]
pub struct MenuListOperator<L> {
    inner: Rc<RefCell<MenuListState<L>>>,
}

impl<L> Clone for MenuListOperator<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L: CompletionList + 'static> MenuListOperator<L> {
    pub fn new(options: RegisterOptions, list: L) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MenuListState {
                options,
                list,
                handle: None,
                query: String::new(),
                inputting: false,
            })),
        }
    }

    /// Definition to register with the engine
    pub fn definition(&self) -> SignalOperatorDefinition {
        let state = self.inner.borrow();
        let def = SignalOperatorDefinition::new(
            state.options.kind.as_str(),
            state.options.signal,
            self.clone(),
        );
        match &state.options.signal_class {
            Some(class) => def.with_class(class.as_str()),
            None => def,
        }
    }

    /// Confirm the active session with `item` (a list click).
    ///
    /// Returns `false` when there is no session or it is already resolved.
    pub fn select(&self, item: &RenderItem) -> bool {
        self.inner.borrow_mut().select(item)
    }

    /// Confirm with the highlighted item
    pub fn select_highlighted(&self) -> bool {
        let mut state = self.inner.borrow_mut();
        match state.list.highlighted() {
            Some(item) => state.select(&item),
            None => false,
        }
    }

    /// Keyword last forwarded to the list
    pub fn query(&self) -> String {
        self.inner.borrow().query.clone()
    }

    /// Whether a session is being typed
    pub fn is_inputting(&self) -> bool {
        self.inner.borrow().inputting
    }

    /// Inspect the list
    pub fn with_list<R>(&self, f: impl FnOnce(&L) -> R) -> R {
        f(&self.inner.borrow().list)
    }
}

impl<L: CompletionList + 'static> SignalOperator for MenuListOperator<L> {
    fn on_signal_start(&mut self, ctx: &SignalContext, handle: SignalHandle) {
        let mut state = self.inner.borrow_mut();
        state.handle = Some(handle);
        state.inputting = true;
        state.query.clear();

        let geometry = SignalGeometry {
            top: ctx.geometry.top + MENU_OFFSET_Y,
            ..ctx.geometry
        };
        let MenuListState { options, list, .. } = &mut *state;
        list.show(&options.kind, &options.render_list, geometry, &ctx.ignore_attribute);
    }

    fn on_signal_input(&mut self, _ctx: &SignalContext, keyword: &str) {
        let mut state = self.inner.borrow_mut();
        state.query = keyword.to_string();
        state.list.set_query(keyword);
    }

    fn on_signal_cancel(&mut self, _ctx: &SignalContext) {
        self.inner.borrow_mut().reset();
    }

    fn on_signal_confirm(&mut self, _ctx: &SignalContext, _data: &SignalData, _extra: Option<&ExtraData>) {
        self.inner.borrow_mut().reset();
    }

    fn on_signal_key_stroke(&mut self, _ctx: &SignalContext, stroke: &Keystroke) -> bool {
        let mut state = self.inner.borrow_mut();
        // Modified keys belong to the host (e.g. Ctrl+Enter to submit)
        if !state.list.is_visible() || !stroke.is_plain() {
            return false;
        }
        match stroke.key {
            KeyCode::Enter => match state.list.highlighted() {
                Some(item) => state.select(&item),
                None => false,
            },
            KeyCode::Down => {
                state.list.next();
                true
            }
            KeyCode::Up => {
                state.list.prev();
                true
            }
            KeyCode::Escape => {
                state.list.hide();
                if let Some(handle) = state.handle.as_ref() {
                    handle.cancel();
                }
                true
            }
            _ => false,
        }
    }
}
