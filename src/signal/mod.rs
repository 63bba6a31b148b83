//! Signal detection and inline completion
//!
//! A *signal* is a registered trigger character (e.g. `@`). Typing it opens a
//! completion session handled by a pluggable [`SignalOperator`]; confirming
//! the session replaces the typed text with a non-editable inline token.
//!
//! # Architecture
//!
//! ```text
//! SurfaceEvent → SignalEngine ──lookup──▶ SignalRegistry
//!                    │                         │
//!                    │ hooks                   ▼
//!                    └──────────────▶ SignalOperatorDefinition
//!                                      └─ Box<dyn SignalOperator>
//!                                            │ SignalHandle::confirm / cancel
//!                    SignalEngine::settle ◀──┘
//! ```
//!
//! - [`SignalRegistry`]: per-surface operator lookup by trigger and by type
//! - [`SignalEngine`]: the session state machine
//! - [`SignalHandle`]: one-shot confirm/cancel handle given to operators
//! - [`MenuListOperator`] / [`MemberOperator`]: ready-made operators

mod data;
mod engine;
mod handle;
mod member;
mod menulist;
mod operator;
mod registry;

pub use data::{
    create_signal_html, has_valid_content, signal_tokens, valid_html_content, ExtraData,
    SignalData,
};
pub use engine::{EngineError, SessionState, SignalEngine};
pub use handle::{Resolution, SignalHandle};
pub use member::{CommentUser, MemberOperator, MemberState, MEMBER_KIND, MEMBER_SIGNAL};
pub use menulist::{
    CompletionList, MenuListOperator, RegisterOptions, RenderItem, StaticList, MENU_OFFSET_Y,
};
pub use operator::{
    BreakPolicy, SignalContext, SignalOperator, SignalOperatorDefinition, SignalRender,
};
pub use registry::{RegistryError, SignalRegistry};

/// Attribute carrying the trigger character of a token
pub const ATTR_SIGNAL: &str = "data-signal";
/// Attribute carrying the operator type name of a token
pub const ATTR_SIGNAL_TYPE: &str = "data-signal-type";
/// Attribute carrying the JSON-serialized properties of a token
pub const ATTR_SIGNAL_PROPS: &str = "data-signal-props";
