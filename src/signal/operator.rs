//! Operator contract: the hooks a completion workflow implements, and the
//! definition it is registered under.

use std::fmt;

use super::data::{create_signal_html, ExtraData, SignalData};
use super::handle::SignalHandle;
use crate::editable::{CursorSpan, SignalGeometry};
use crate::keymap::Keystroke;

/// What the engine tells an operator about the session it is driving
#[derive(Debug, Clone, PartialEq)]
pub struct SignalContext {
    pub signal: char,
    pub kind: String,
    /// Caret position relative to the surface, plus the surface size
    pub geometry: SignalGeometry,
    /// Live selection at the time of the call
    pub live_span: Option<CursorSpan>,
    /// Attribute a completion UI must carry so clicks on it keep the session
    pub ignore_attribute: String,
}

/// A pluggable completion workflow.
///
/// All hooks are invoked by the engine, never by the operator itself. The
/// operator ends a session only through the [`SignalHandle`] it receives in
/// [`on_signal_start`](SignalOperator::on_signal_start).
pub trait SignalOperator {
    /// A session for this operator opened
    fn on_signal_start(&mut self, ctx: &SignalContext, handle: SignalHandle);

    /// The text typed since the trigger changed
    fn on_signal_input(&mut self, ctx: &SignalContext, keyword: &str);

    /// The session was cancelled (by the operator, the user or the engine)
    fn on_signal_cancel(&mut self, ctx: &SignalContext);

    /// The session was confirmed and the token inserted
    fn on_signal_confirm(&mut self, ctx: &SignalContext, data: &SignalData, extra: Option<&ExtraData>);

    /// A key was pressed during the session. Return `true` to suppress the
    /// surface's default handling of it.
    fn on_signal_key_stroke(&mut self, _ctx: &SignalContext, _stroke: &Keystroke) -> bool {
        false
    }
}

/// Custom token renderer
pub enum SignalRender {
    /// Fixed markup, regardless of the result data
    Static(String),
    /// Markup computed from the result data
    Dynamic(Box<dyn Fn(&SignalData) -> String>),
}

impl SignalRender {
    pub fn render(&self, data: &SignalData) -> String {
        match self {
            SignalRender::Static(markup) => markup.clone(),
            SignalRender::Dynamic(render) => render(data),
        }
    }
}

impl fmt::Debug for SignalRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalRender::Static(markup) => f.debug_tuple("Static").field(markup).finish(),
            SignalRender::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// When typed keyword text aborts a session
#[derive(Debug, Clone, Default)]
pub enum BreakPolicy {
    /// Any whitespace, plus the surface's configured break characters
    #[default]
    Whitespace,
    /// Any of these characters
    Chars(Vec<char>),
    /// Arbitrary predicate over the keyword
    Custom(fn(&str) -> bool),
    /// Never break; only the operator or the user ends the session
    Never,
}

impl BreakPolicy {
    /// Check the keyword against this policy
    pub fn should_break(&self, keyword: &str) -> bool {
        self.should_break_with(keyword, &[])
    }

    /// Check the keyword, with `extra` characters extending the whitespace rule
    pub fn should_break_with(&self, keyword: &str, extra: &[char]) -> bool {
        match self {
            BreakPolicy::Whitespace => keyword
                .chars()
                .any(|c| c.is_whitespace() || extra.contains(&c)),
            BreakPolicy::Chars(chars) => keyword.chars().any(|c| chars.contains(&c)),
            BreakPolicy::Custom(pred) => pred(keyword),
            BreakPolicy::Never => false,
        }
    }
}

/// A registered operator: identity, rendering options and hooks.
///
/// Immutable after registration apart from the operator's own state.
pub struct SignalOperatorDefinition {
    kind: String,
    signal: char,
    dom_class: Option<String>,
    render: Option<SignalRender>,
    break_policy: BreakPolicy,
    operator: Box<dyn SignalOperator>,
}

impl SignalOperatorDefinition {
    pub fn new(kind: impl Into<String>, signal: char, operator: impl SignalOperator + 'static) -> Self {
        Self::from_boxed(kind, signal, Box::new(operator))
    }

    pub fn from_boxed(kind: impl Into<String>, signal: char, operator: Box<dyn SignalOperator>) -> Self {
        Self {
            kind: kind.into(),
            signal,
            dom_class: None,
            render: None,
            break_policy: BreakPolicy::default(),
            operator,
        }
    }

    /// CSS class of the inserted token (builder pattern)
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.dom_class = Some(class.into());
        self
    }

    /// Custom token renderer (builder pattern)
    pub fn with_render(mut self, render: SignalRender) -> Self {
        self.render = Some(render);
        self
    }

    /// Break condition for keyword input (builder pattern)
    pub fn with_break_policy(mut self, policy: BreakPolicy) -> Self {
        self.break_policy = policy;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn signal(&self) -> char {
        self.signal
    }

    pub fn dom_class(&self) -> Option<&str> {
        self.dom_class.as_deref()
    }

    pub fn break_policy(&self) -> &BreakPolicy {
        &self.break_policy
    }

    /// Markup inserted on confirmation
    pub fn render_markup(&self, data: &SignalData) -> String {
        match &self.render {
            Some(render) => render.render(data),
            None => create_signal_html(data, self.dom_class()),
        }
    }

    pub(crate) fn operator_mut(&mut self) -> &mut dyn SignalOperator {
        self.operator.as_mut()
    }
}

impl fmt::Debug for SignalOperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalOperatorDefinition")
            .field("kind", &self.kind)
            .field("signal", &self.signal)
            .field("dom_class", &self.dom_class)
            .field("render", &self.render)
            .field("break_policy", &self.break_policy)
            .finish_non_exhaustive()
    }
}
