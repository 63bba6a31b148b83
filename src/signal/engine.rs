//! Signal lifecycle engine
//!
//! One engine drives one editable surface. It is `Idle` until a registered
//! trigger character is typed, then holds a single active session until the
//! operator confirms or cancels it, or the engine cancels it (focus loss,
//! click, new trigger, caret moved before the trigger, break condition).
//!
//! Offsets kept across events are linear offsets ([`EditableContent`] docs),
//! so they survive node splits caused by edits elsewhere in the surface.
//!
//! [`EditableContent`]: crate::editable::EditableContent

use thiserror::Error;

use super::data::{has_valid_content, ExtraData, SignalData};
use super::handle::{Resolution, SignalHandle};
use super::operator::{SignalContext, SignalOperator, SignalOperatorDefinition};
use super::registry::{RegistryError, SignalRegistry};
use crate::commands::Cmd;
use crate::config::SurfaceConfig;
use crate::editable::{markup, range, CursorSpan, MarkupError, SurfaceAccess};
use crate::events::{InputEvent, InputKind, SurfaceEvent};
use crate::keymap::Keystroke;
use crate::tracing::SessionSnapshot;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("surface is not mounted yet, retry after it has finished initializing")]
    NotReady,
    #[error("no operator registered for active signal type '{kind}'")]
    OperatorMissing { kind: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// Public view of the engine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active {
        id: u64,
        signal: char,
        kind: String,
        /// Linear offset right after the trigger character
        origin: usize,
        /// Linear offset of the caret at the last input
        live: usize,
    },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }
}

#[derive(Debug)]
struct SignalSession {
    id: u64,
    signal: char,
    kind: String,
    origin: usize,
    live: usize,
    handle: SignalHandle,
}

type InputListener = Box<dyn FnMut(&InputEvent)>;

/// Trigger detection and session state machine for one surface
pub struct SignalEngine<S: SurfaceAccess> {
    surface: Option<S>,
    config: SurfaceConfig,
    registry: SignalRegistry,
    session: Option<SignalSession>,
    next_session: u64,
    composing: bool,
    /// Last input seen while composing
    composition_buffer: Option<InputEvent>,
    focused: bool,
    /// Surface HTML as of the last processed edit
    content_value: String,
    /// Caret relocation not yet run by the host
    pending_focus: Option<Cmd>,
    input_listener: Option<InputListener>,
}

impl<S: SurfaceAccess> SignalEngine<S> {
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            surface: None,
            config,
            registry: SignalRegistry::new(),
            session: None,
            next_session: 1,
            composing: false,
            composition_buffer: None,
            focused: false,
            content_value: String::new(),
            pending_focus: None,
            input_listener: None,
        }
    }

    /// Attach the host surface and apply the configured default content.
    ///
    /// Returns a focus command when `auto_focus` is set.
    pub fn mount(&mut self, surface: S) -> Result<Option<Cmd>, EngineError> {
        self.surface = Some(surface);
        let default_content = self.config.default_content.clone();
        self.set_content(&default_content)?;
        tracing::debug!("surface mounted");
        Ok(self.config.auto_focus.then(|| self.focus(true)))
    }

    /// Register an operator. Fails before [`mount`](Self::mount) and on a
    /// duplicate trigger character.
    pub fn register_signal_operator(&mut self, def: SignalOperatorDefinition) -> Result<(), EngineError> {
        if self.surface.is_none() {
            return Err(EngineError::NotReady);
        }
        self.registry.register(def)?;
        Ok(())
    }

    /// Register a callback that sees every processed input event (and paste)
    /// before signal handling.
    pub fn set_input_listener(&mut self, listener: impl FnMut(&InputEvent) + 'static) {
        self.input_listener = Some(Box::new(listener));
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn registry(&self) -> &SignalRegistry {
        &self.registry
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Surface HTML as of the last processed edit
    pub fn content_value(&self) -> &str {
        &self.content_value
    }

    /// Deferred caret relocation waiting for the host
    pub fn pending_focus(&self) -> Option<&Cmd> {
        self.pending_focus.as_ref()
    }

    pub fn session_state(&self) -> SessionState {
        match &self.session {
            None => SessionState::Idle,
            Some(s) => SessionState::Active {
                id: s.id,
                signal: s.signal,
                kind: s.kind.clone(),
                origin: s.origin,
                live: s.live,
            },
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace the surface content with `html`. Any active session is
    /// cancelled first.
    pub fn set_content(&mut self, html: &str) -> Result<(), EngineError> {
        if self.surface.is_none() {
            return Err(EngineError::NotReady);
        }
        let nodes = markup::parse_markup(html)?;
        self.end_session("content replaced")?;
        self.pending_focus = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.content_mut().set_nodes(nodes);
        }
        self.content_value = html.to_string();
        Ok(())
    }

    /// Current surface content as HTML
    pub fn get_content(&self) -> String {
        match &self.surface {
            Some(surface) => markup::to_html(surface.content().nodes()),
            None => self.content_value.clone(),
        }
    }

    pub fn clear_content(&mut self) -> Result<(), EngineError> {
        self.set_content("")
    }

    /// Whether the surface holds anything besides whitespace and line breaks
    pub fn has_content(&self) -> bool {
        has_valid_content(&self.get_content())
    }

    /// Command that focuses the surface on the host's next tick
    pub fn focus(&self, collapse_to_end: bool) -> Cmd {
        Cmd::Focus { collapse_to_end }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Handle one host event.
    ///
    /// A deferred caret relocation still pending from the previous event is
    /// run first (or dropped, for edits the surface has already committed),
    /// then any resolution recorded outside a hook is applied.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<Option<Cmd>, EngineError> {
        if self.surface.is_none() {
            return Err(EngineError::NotReady);
        }
        let _span = tracing::debug_span!("surface_event", event = event.name()).entered();
        let before = SessionSnapshot::from_engine(self);

        if let Some(cmd) = self.pending_focus.clone() {
            if event.is_post_edit() {
                // The edit already landed at the live caret; relocating now
                // would move the caret back in front of it.
                tracing::trace!("dropping deferred focus, edit already applied");
                self.pending_focus = None;
            } else {
                tracing::trace!("running deferred focus before next event");
                self.run_cmd(&cmd);
            }
        }
        let settled = self.settle()?;

        let result = match event {
            SurfaceEvent::Input(input) => self.input(&input, true)?,
            SurfaceEvent::CompositionStart => {
                self.composing = true;
                None
            }
            SurfaceEvent::CompositionEnd(input) => self.composition_end(input)?,
            SurfaceEvent::Click => {
                self.end_session("click inside surface")?;
                Some(self.focus(false))
            }
            SurfaceEvent::Focus => {
                self.focused = true;
                None
            }
            SurfaceEvent::BlurOutside { ignored } => self.blur_outside(ignored)?,
            SurfaceEvent::KeyStroke(stroke) => self.key_stroke(&stroke)?,
            SurfaceEvent::Paste(text) => self.paste(text)?,
        };

        let after = SessionSnapshot::from_engine(self);
        if let Some(diff) = before.diff(&after) {
            tracing::debug!(target: "signal", "{}", diff);
        }
        Ok(Cmd::collect(vec![
            Cmd::from(settled),
            Cmd::from(result),
        ]))
    }

    pub fn on_input(&mut self, event: InputEvent) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::Input(event))
    }

    pub fn on_composition_start(&mut self) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::CompositionStart)
    }

    pub fn on_composition_end(&mut self, event: InputEvent) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::CompositionEnd(event))
    }

    pub fn on_click(&mut self) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::Click)
    }

    pub fn on_focus(&mut self) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::Focus)
    }

    pub fn on_blur_outside(&mut self, ignored: bool) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::BlurOutside { ignored })
    }

    pub fn on_key_stroke(&mut self, stroke: Keystroke) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::KeyStroke(stroke))
    }

    pub fn on_paste(&mut self, text: impl Into<String>) -> Result<Option<Cmd>, EngineError> {
        self.handle_event(SurfaceEvent::Paste(text.into()))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Apply a resolution recorded on the active session's handle, if any.
    ///
    /// Hosts call this after an operator resolved from outside a hook (for
    /// example a click in a completion list).
    pub fn settle(&mut self) -> Result<Option<Cmd>, EngineError> {
        let Some(resolution) = self.session.as_ref().and_then(|s| s.handle.take()) else {
            return Ok(None);
        };
        match resolution {
            Resolution::Cancelled => {
                self.end_session("cancelled by operator")?;
                Ok(None)
            }
            Resolution::Confirmed(data, extra) => self.apply_confirm(data, extra),
        }
    }

    /// Cancel the active session. A no-op when idle.
    pub fn cancel_signal(&mut self) -> Result<(), EngineError> {
        self.end_session("cancelled by host")
    }

    /// Confirm the active session from the host side.
    ///
    /// Goes through the session handle, so it loses against a resolution the
    /// operator already recorded.
    pub fn confirm_signal(
        &mut self,
        data: SignalData,
        extra: Option<ExtraData>,
    ) -> Result<Option<Cmd>, EngineError> {
        let Some(session) = self.session.as_ref() else {
            tracing::warn!("confirm requested while idle, ignoring");
            return Ok(None);
        };
        match extra {
            Some(extra) => session.handle.confirm_with(data, extra),
            None => session.handle.confirm(data),
        };
        self.settle()
    }

    /// Run a command returned by the engine.
    ///
    /// A `FocusAt` runs at most once: after the host (or the next event) has
    /// run it, repeats are ignored.
    pub fn run_cmd(&mut self, cmd: &Cmd) {
        match cmd {
            Cmd::Focus { collapse_to_end } => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.request_focus();
                    if *collapse_to_end {
                        surface.content_mut().collapse_to_end();
                    }
                    self.focused = true;
                }
            }
            Cmd::FocusAt {
                position,
                scroll_into_view,
            } => {
                if self.pending_focus.as_ref() != Some(cmd) {
                    tracing::trace!("stale focus command ignored");
                    return;
                }
                self.pending_focus = None;
                if let Some(surface) = self.surface.as_mut() {
                    surface.request_focus();
                    surface.content_mut().collapse_to(*position);
                    if *scroll_into_view {
                        surface.scroll_into_view(*position);
                    }
                    self.focused = true;
                }
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.run_cmd(cmd);
                }
            }
            Cmd::None | Cmd::Redraw | Cmd::PreventDefault => {}
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn input(&mut self, event: &InputEvent, notify: bool) -> Result<Option<Cmd>, EngineError> {
        if self.composing {
            tracing::trace!("composition in progress, input buffered");
            self.composition_buffer = Some(event.clone());
            return Ok(None);
        }
        if notify {
            if let Some(listener) = self.input_listener.as_mut() {
                listener(event);
            }
        }

        let mut cmds = Vec::new();
        let mut opened = false;
        if let Some(signal) = event
            .trigger_char()
            .filter(|c| self.registry.is_trigger(*c))
        {
            if self.session.is_some() {
                self.end_session("new trigger typed")?;
            }
            let span = self.surface.as_ref().and_then(|s| s.content().selection());
            if let Some(span) = span {
                cmds.extend(self.start_session(signal, span)?);
                opened = true;
            }
        }

        self.sync_content();
        if !opened {
            cmds.extend(self.refresh_keyword()?);
        }
        Ok(Cmd::collect(cmds))
    }

    fn composition_end(&mut self, event: InputEvent) -> Result<Option<Cmd>, EngineError> {
        self.composing = false;
        let buffered = self.composition_buffer.take();
        let event = match (event.data.is_some(), buffered) {
            (false, Some(buffered)) => buffered,
            _ => event,
        };
        self.input(&event, true)
    }

    fn blur_outside(&mut self, ignored: bool) -> Result<Option<Cmd>, EngineError> {
        if ignored {
            tracing::trace!("outside interaction on ignored target");
            return Ok(None);
        }
        self.focused = false;
        self.end_session("focus lost")?;
        let html = self.get_content();
        if self.config.clear_on_blur_when_empty && !html.is_empty() && !has_valid_content(&html) {
            self.clear_content()?;
            return Ok(Some(Cmd::Redraw));
        }
        Ok(None)
    }

    fn key_stroke(&mut self, stroke: &Keystroke) -> Result<Option<Cmd>, EngineError> {
        if self.composing {
            return Ok(None);
        }
        let Some((signal, kind)) = self.session.as_ref().map(|s| (s.signal, s.kind.clone())) else {
            return Ok(None);
        };
        let ctx = self.context(signal, &kind);
        let handled = self.operator_mut(&kind)?.on_signal_key_stroke(&ctx, stroke);
        tracing::trace!(%stroke, handled, "key stroke offered to operator");

        let mut cmds = Vec::new();
        if handled {
            cmds.push(Cmd::PreventDefault);
        }
        cmds.extend(self.settle()?);
        Ok(Cmd::collect(cmds))
    }

    fn paste(&mut self, text: String) -> Result<Option<Cmd>, EngineError> {
        if text.is_empty() {
            return Ok(Some(Cmd::PreventDefault));
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.content_mut().type_text(&text);
        }
        if let Some(listener) = self.input_listener.as_mut() {
            listener(&InputEvent::new(InputKind::InsertFromPaste, Some(text)));
        }
        let processed = self.input(&InputEvent::paste(), false)?;
        Ok(Cmd::collect(vec![
            Cmd::PreventDefault,
            Cmd::Redraw,
            Cmd::from(processed),
        ]))
    }

    fn start_session(&mut self, signal: char, span: CursorSpan) -> Result<Option<Cmd>, EngineError> {
        let kind = self
            .registry
            .lookup_by_trigger(signal)
            .map(|def| def.kind().to_string())
            .ok_or_else(|| EngineError::OperatorMissing {
                kind: signal.to_string(),
            })?;
        let origin = match &self.surface {
            Some(surface) => surface.content().ordered(&span).0,
            None => return Err(EngineError::NotReady),
        };

        let id = self.next_session;
        self.next_session += 1;
        let handle = SignalHandle::new(id);
        self.session = Some(SignalSession {
            id,
            signal,
            kind: kind.clone(),
            origin,
            live: origin,
            handle: handle.clone(),
        });
        tracing::debug!(id, %signal, kind = %kind, origin, "signal session started");

        let ctx = self.context(signal, &kind);
        self.operator_mut(&kind)?.on_signal_start(&ctx, handle);
        self.settle()
    }

    /// Recompute the live span and forward the keyword to the operator
    fn refresh_keyword(&mut self) -> Result<Option<Cmd>, EngineError> {
        let Some((id, signal, kind, origin)) = self
            .session
            .as_ref()
            .map(|s| (s.id, s.signal, s.kind.clone(), s.origin))
        else {
            return Ok(None);
        };
        let Some(surface) = self.surface.as_mut() else {
            return Err(EngineError::NotReady);
        };
        let content = surface.content_mut();
        let Some(live) = content.selection() else {
            return Ok(None);
        };

        let (live_start, live_end) = content.ordered(&live);
        if live_start < origin {
            tracing::trace!(live_start, origin, "caret moved before trigger");
            self.end_session("caret moved before trigger")?;
            return Ok(None);
        }

        let start = CursorSpan::collapsed(content.position_at(origin));
        let keyword = range::extract_text(content, &start, &live);
        if let Some(session) = self.session.as_mut() {
            session.live = live_end;
        }
        tracing::trace!(id, keyword = %keyword, "signal keyword");

        let ctx = self.context(signal, &kind);
        self.operator_mut(&kind)?.on_signal_input(&ctx, &keyword);
        let settled = self.settle()?;

        if self.session.as_ref().is_some_and(|s| s.id == id) {
            let breaks = self
                .registry
                .lookup_by_type(&kind)
                .map(|def| {
                    def.break_policy()
                        .should_break_with(&keyword, &self.config.break_chars)
                })
                .ok_or_else(|| EngineError::OperatorMissing { kind: kind.clone() })?;
            if breaks {
                self.end_session("break condition")?;
            }
        }
        Ok(settled)
    }

    /// Replace the typed trigger and keyword with the token and notify the
    /// operator.
    fn apply_confirm(
        &mut self,
        data: SignalData,
        extra: Option<ExtraData>,
    ) -> Result<Option<Cmd>, EngineError> {
        let Some((id, signal, kind, origin, live)) = self
            .session
            .as_ref()
            .map(|s| (s.id, s.signal, s.kind.clone(), s.origin, s.live))
        else {
            return Ok(None);
        };
        let markup_source = self
            .registry
            .lookup_by_type(&kind)
            .map(|def| def.render_markup(&data))
            .ok_or_else(|| EngineError::OperatorMissing { kind: kind.clone() })?;
        let nodes = match markup::parse_markup(&markup_source) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "token markup rejected, cancelling");
                self.end_session("token markup rejected")?;
                return Err(e.into());
            }
        };

        self.session = None;
        let Some(surface) = self.surface.as_mut() else {
            return Err(EngineError::NotReady);
        };
        let content = surface.content_mut();
        let start = CursorSpan::collapsed(content.position_at(origin));
        let live_span = CursorSpan::collapsed(content.position_at(live));
        let at = range::delete_text(content, &start, &live_span).unwrap_or(live_span);
        let caret = range::insert_nodes(content, nodes, &at);
        self.sync_content();
        tracing::debug!(id, kind = %kind, "signal session confirmed");

        let focus = Cmd::FocusAt {
            position: caret,
            scroll_into_view: true,
        };
        self.pending_focus = Some(focus.clone());

        let ctx = self.context(signal, &kind);
        self.operator_mut(&kind)?
            .on_signal_confirm(&ctx, &data, extra.as_ref());
        Ok(Some(Cmd::batch(vec![Cmd::Redraw, focus])))
    }

    /// Tear down the active session and run the cancel hook. Idempotent.
    fn end_session(&mut self, reason: &str) -> Result<(), EngineError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session.handle.close();
        tracing::debug!(id = session.id, kind = %session.kind, reason, "signal session cancelled");

        let ctx = self.context(session.signal, &session.kind);
        self.operator_mut(&session.kind)?.on_signal_cancel(&ctx);
        Ok(())
    }

    fn context(&self, signal: char, kind: &str) -> SignalContext {
        let (geometry, live_span) = match &self.surface {
            Some(surface) => (surface.caret_geometry(), surface.content().selection()),
            None => Default::default(),
        };
        SignalContext {
            signal,
            kind: kind.to_string(),
            geometry,
            live_span,
            ignore_attribute: self.config.ignore_attribute.clone(),
        }
    }

    fn operator_mut(&mut self, kind: &str) -> Result<&mut dyn SignalOperator, EngineError> {
        self.registry
            .lookup_by_type_mut(kind)
            .map(|def| def.operator_mut())
            .ok_or_else(|| EngineError::OperatorMissing {
                kind: kind.to_string(),
            })
    }

    fn sync_content(&mut self) {
        if let Some(surface) = &self.surface {
            self.content_value = markup::to_html(surface.content().nodes());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::editable::MemorySurface;

    #[derive(Default)]
    struct Log {
        starts: usize,
        inputs: Vec<String>,
        cancels: usize,
        confirms: usize,
        handle: Option<SignalHandle>,
    }

    struct Recording(Rc<RefCell<Log>>);

    impl SignalOperator for Recording {
        fn on_signal_start(&mut self, _ctx: &SignalContext, handle: SignalHandle) {
            let mut log = self.0.borrow_mut();
            log.starts += 1;
            log.handle = Some(handle);
        }
        fn on_signal_input(&mut self, _ctx: &SignalContext, keyword: &str) {
            self.0.borrow_mut().inputs.push(keyword.to_string());
        }
        fn on_signal_cancel(&mut self, _ctx: &SignalContext) {
            self.0.borrow_mut().cancels += 1;
        }
        fn on_signal_confirm(&mut self, _ctx: &SignalContext, _data: &SignalData, _extra: Option<&ExtraData>) {
            self.0.borrow_mut().confirms += 1;
        }
    }

    fn engine() -> (SignalEngine<MemorySurface>, Rc<RefCell<Log>>) {
        let mut engine = SignalEngine::new(SurfaceConfig::default());
        engine.mount(MemorySurface::default()).unwrap();
        let log = Rc::new(RefCell::new(Log::default()));
        engine
            .register_signal_operator(SignalOperatorDefinition::new("member", '@', Recording(log.clone())))
            .unwrap();
        (engine, log)
    }

    fn type_str(engine: &mut SignalEngine<MemorySurface>, text: &str) {
        for ch in text.chars() {
            let event = InputEvent::insert_text(ch.to_string());
            event.apply_default(&mut engine.surface_mut().unwrap().content);
            engine.on_input(event).unwrap();
        }
    }

    #[test]
    fn test_register_before_mount_is_not_ready() {
        let mut engine: SignalEngine<MemorySurface> = SignalEngine::new(SurfaceConfig::default());
        let log = Rc::new(RefCell::new(Log::default()));
        let err = engine
            .register_signal_operator(SignalOperatorDefinition::new("member", '@', Recording(log)))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
        assert!(matches!(engine.on_click(), Err(EngineError::NotReady)));
    }

    #[test]
    fn test_trigger_opens_session_and_tracks_keyword() {
        let (mut engine, log) = engine();
        type_str(&mut engine, "hi @Al");

        assert_eq!(log.borrow().starts, 1);
        assert_eq!(log.borrow().inputs, vec!["A", "Al"]);
        assert_eq!(
            engine.session_state(),
            SessionState::Active {
                id: 1,
                signal: '@',
                kind: "member".into(),
                origin: 4,
                live: 6,
            }
        );
    }

    #[test]
    fn test_caret_before_trigger_cancels() {
        let (mut engine, log) = engine();
        type_str(&mut engine, "@");
        let event = InputEvent::delete_backward();
        event.apply_default(&mut engine.surface_mut().unwrap().content);
        engine.on_input(event).unwrap();

        assert_eq!(log.borrow().cancels, 1);
        assert_eq!(engine.session_state(), SessionState::Idle);
    }

    #[test]
    fn test_confirm_sets_pending_focus_run_once() {
        let (mut engine, log) = engine();
        type_str(&mut engine, "@B");
        let cmd = engine
            .confirm_signal(SignalData::new('@', "member", "@Bob"), None)
            .unwrap()
            .unwrap();
        assert_eq!(log.borrow().confirms, 1);
        assert!(engine.pending_focus().is_some());

        engine.run_cmd(&cmd);
        assert!(engine.pending_focus().is_none());
        assert_eq!(engine.surface().unwrap().focus_requests, 1);

        engine.run_cmd(&cmd);
        assert_eq!(engine.surface().unwrap().focus_requests, 1);
    }

    #[test]
    fn test_pending_focus_runs_before_next_event() {
        let (mut engine, _log) = engine();
        type_str(&mut engine, "@B");
        engine
            .confirm_signal(SignalData::new('@', "member", "@Bob"), None)
            .unwrap();
        engine.on_focus().unwrap();
        assert!(engine.pending_focus().is_none());
        assert_eq!(engine.surface().unwrap().scrolled_to.len(), 1);
    }

    #[test]
    fn test_operator_resolution_outside_hook_applied_on_settle() {
        let (mut engine, log) = engine();
        type_str(&mut engine, "@");
        let handle = log.borrow().handle.clone().unwrap();
        handle.cancel();
        assert!(engine.session_state().is_active());

        engine.settle().unwrap();
        assert_eq!(engine.session_state(), SessionState::Idle);
        assert_eq!(log.borrow().cancels, 1);
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let (mut engine, log) = engine();
        engine.cancel_signal().unwrap();
        engine.cancel_signal().unwrap();
        assert_eq!(log.borrow().cancels, 0);
    }
}
