//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sigil::commands::Cmd;
use sigil::config::SurfaceConfig;
use sigil::editable::{EditableContent, MemorySurface};
use sigil::events::InputEvent;
use sigil::keymap::Keystroke;
use sigil::signal::{
    ExtraData, SignalContext, SignalData, SignalEngine, SignalHandle, SignalOperator,
    SignalOperatorDefinition,
};

/// One hook invocation seen by a [`Recording`] operator
#[derive(Debug, Clone, PartialEq)]
pub enum Hook {
    Start(char),
    Input(String),
    Cancel,
    Confirm(SignalData, Option<ExtraData>),
    KeyStroke(Keystroke),
}

/// Shared log behind a [`Recording`] operator
#[derive(Debug, Default)]
pub struct HookLog {
    pub hooks: Vec<Hook>,
    pub handle: Option<SignalHandle>,
    /// Key strokes the operator claims
    pub intercept: Vec<Keystroke>,
}

impl HookLog {
    pub fn inputs(&self) -> Vec<String> {
        self.hooks
            .iter()
            .filter_map(|h| match h {
                Hook::Input(keyword) => Some(keyword.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, f: impl Fn(&Hook) -> bool) -> usize {
        self.hooks.iter().filter(|h| f(h)).count()
    }

    pub fn starts(&self) -> usize {
        self.count(|h| matches!(h, Hook::Start(_)))
    }

    pub fn cancels(&self) -> usize {
        self.count(|h| matches!(h, Hook::Cancel))
    }

    pub fn confirms(&self) -> usize {
        self.count(|h| matches!(h, Hook::Confirm(..)))
    }
}

/// Operator that records every hook and keeps the latest handle
pub struct Recording(pub Rc<RefCell<HookLog>>);

impl SignalOperator for Recording {
    fn on_signal_start(&mut self, ctx: &SignalContext, handle: SignalHandle) {
        let mut log = self.0.borrow_mut();
        log.hooks.push(Hook::Start(ctx.signal));
        log.handle = Some(handle);
    }

    fn on_signal_input(&mut self, _ctx: &SignalContext, keyword: &str) {
        self.0.borrow_mut().hooks.push(Hook::Input(keyword.to_string()));
    }

    fn on_signal_cancel(&mut self, _ctx: &SignalContext) {
        self.0.borrow_mut().hooks.push(Hook::Cancel);
    }

    fn on_signal_confirm(&mut self, _ctx: &SignalContext, data: &SignalData, extra: Option<&ExtraData>) {
        self.0
            .borrow_mut()
            .hooks
            .push(Hook::Confirm(data.clone(), extra.cloned()));
    }

    fn on_signal_key_stroke(&mut self, _ctx: &SignalContext, stroke: &Keystroke) -> bool {
        let mut log = self.0.borrow_mut();
        log.hooks.push(Hook::KeyStroke(*stroke));
        log.intercept.contains(stroke)
    }
}

/// Recording operator definition plus its log
pub fn recording(kind: &str, signal: char) -> (SignalOperatorDefinition, Rc<RefCell<HookLog>>) {
    let log = Rc::new(RefCell::new(HookLog::default()));
    let def = SignalOperatorDefinition::new(kind, signal, Recording(log.clone()));
    (def, log)
}

/// Mounted engine with a recording `@`/`member` operator
pub fn test_engine(initial: &str) -> (SignalEngine<MemorySurface>, Rc<RefCell<HookLog>>) {
    let config = SurfaceConfig {
        default_content: initial.to_string(),
        ..SurfaceConfig::default()
    };
    let mut engine = SignalEngine::new(config);
    engine.mount(MemorySurface::default()).unwrap();
    engine.surface_mut().unwrap().content.collapse_to_end();

    let (def, log) = recording("member", '@');
    engine.register_signal_operator(def).unwrap();
    (engine, log)
}

/// Apply an input the way the host surface does, then report it
pub fn input(engine: &mut SignalEngine<MemorySurface>, event: InputEvent) -> Option<Cmd> {
    event.apply_default(&mut engine.surface_mut().unwrap().content);
    engine.on_input(event).unwrap()
}

/// Type text one character at a time, running returned commands
pub fn type_str(engine: &mut SignalEngine<MemorySurface>, text: &str) {
    for ch in text.chars() {
        if let Some(cmd) = input(engine, InputEvent::insert_text(ch.to_string())) {
            engine.run_cmd(&cmd);
        }
    }
}

/// Press backspace once
pub fn backspace(engine: &mut SignalEngine<MemorySurface>) {
    input(engine, InputEvent::delete_backward());
}

pub fn content(engine: &SignalEngine<MemorySurface>) -> &EditableContent {
    &engine.surface().unwrap().content
}

/// Result data of the `@Alice` scenario
pub fn alice() -> SignalData {
    SignalData::new('@', "member", "@Alice").with_props(serde_json::json!({"user_id": "1"}))
}

/// Content with the caret collapsed at the end
pub fn typed(text: &str) -> EditableContent {
    let mut content = EditableContent::new();
    content.type_text(text);
    content
}
