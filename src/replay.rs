//! Scripted event replay against an in-memory surface
//!
//! A replay script describes the operators to register and a list of user
//! steps. The replay acts as the host: it applies default edits, forwards
//! events to the engine, runs returned commands and routes list selections
//! to the operator of the active session.
//!
//! ```yaml
//! content: "Hello "
//! operators:
//!   - kind: member
//!     signal: "@"
//!     props_key: user_id
//!     candidates:
//!       - { value: "1", label: Alice }
//! steps:
//!   - type: "@Al"
//!   - key: ArrowDown
//!   - select: 0
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::commands::Cmd;
use crate::config::SurfaceConfig;
use crate::editable::{EditableContent, MemorySurface, SurfaceAccess};
use crate::events::InputEvent;
use crate::keymap::{parse_key_string, KeyCode, KeyParseError};
use crate::signal::{
    signal_tokens, EngineError, MenuListOperator, RegisterOptions, RenderItem, SessionState,
    SignalData, SignalEngine, StaticList,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid replay script: {0}")]
    Script(#[from] serde_yaml::Error),
    #[error("step {index}: {message}")]
    Step { index: usize, message: String },
    #[error(transparent)]
    Key(#[from] KeyParseError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A menu-list operator declared by a script
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSpec {
    pub kind: String,
    pub signal: char,
    #[serde(default)]
    pub class: Option<String>,
    /// Props key the candidate's `value` is stored under
    #[serde(default = "default_props_key")]
    pub props_key: String,
    #[serde(default)]
    pub candidates: Vec<RenderItem>,
}

fn default_props_key() -> String {
    "id".to_string()
}

/// One step as written in YAML: exactly one field must be set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawStep {
    #[serde(rename = "type")]
    pub text: Option<String>,
    pub key: Option<String>,
    pub select: Option<usize>,
    pub paste: Option<String>,
    pub composition: Option<String>,
    pub action: Option<String>,
}

/// A user step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Type text one character at a time
    Type(String),
    /// Press a key (`"ArrowDown"`, `"shift+enter"`, ...)
    Key(String),
    /// Click the candidate at this index in the active list
    Select(usize),
    Paste(String),
    /// Commit text through an input method composition
    Composition(String),
    Click,
    Focus,
    Blur,
    /// Click outside on an element carrying the ignore attribute
    BlurIgnored,
    /// Host-side cancel of the active session
    Cancel,
}

impl TryFrom<RawStep> for Step {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let mut steps = Vec::new();
        if let Some(text) = raw.text {
            steps.push(Step::Type(text));
        }
        if let Some(key) = raw.key {
            steps.push(Step::Key(key));
        }
        if let Some(index) = raw.select {
            steps.push(Step::Select(index));
        }
        if let Some(text) = raw.paste {
            steps.push(Step::Paste(text));
        }
        if let Some(text) = raw.composition {
            steps.push(Step::Composition(text));
        }
        if let Some(action) = raw.action {
            steps.push(match action.as_str() {
                "click" => Step::Click,
                "focus" => Step::Focus,
                "blur" => Step::Blur,
                "blur_ignored" => Step::BlurIgnored,
                "cancel" => Step::Cancel,
                other => return Err(format!("unknown action '{}'", other)),
            });
        }
        match steps.len() {
            1 => Ok(steps.remove(0)),
            0 => Err("empty step".to_string()),
            _ => Err("a step must set exactly one field".to_string()),
        }
    }
}

/// A parsed replay script
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    /// Overrides the config's default content
    pub content: Option<String>,
    pub operators: Vec<OperatorSpec>,
    pub steps: Vec<RawStep>,
}

impl ReplayScript {
    pub fn from_yaml(source: &str) -> Result<Self, ReplayError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// Result of a replay
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub html: String,
    pub tokens: Vec<SignalData>,
    pub state: SessionState,
}

/// Host driving a [`SignalEngine`] over a [`MemorySurface`]
pub struct ReplayHost {
    engine: SignalEngine<MemorySurface>,
    menus: HashMap<String, MenuListOperator<StaticList>>,
}

impl ReplayHost {
    pub fn new(mut config: SurfaceConfig, script: &ReplayScript) -> Result<Self, ReplayError> {
        if let Some(content) = &script.content {
            config.default_content = content.clone();
        }
        let mut engine = SignalEngine::new(config);
        if let Some(cmd) = engine.mount(MemorySurface::default())? {
            engine.run_cmd(&cmd);
        }
        // Scripts start typing at the end of the initial content
        if let Some(surface) = engine.surface_mut() {
            surface.content_mut().collapse_to_end();
        }

        let mut menus = HashMap::new();
        for op in &script.operators {
            let props_key = op.props_key.clone();
            let mut options = RegisterOptions::new(
                op.kind.as_str(),
                op.signal,
                op.candidates.clone(),
                move |item| {
                    let mut props = Map::new();
                    props.insert(props_key.clone(), Value::String(item.value.clone()));
                    Value::Object(props)
                },
            );
            options.signal_class = op.class.clone();
            let menu = MenuListOperator::new(options, StaticList::default());
            engine.register_signal_operator(menu.definition())?;
            menus.insert(op.kind.clone(), menu);
        }

        Ok(Self { engine, menus })
    }

    pub fn engine(&self) -> &SignalEngine<MemorySurface> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SignalEngine<MemorySurface> {
        &mut self.engine
    }

    /// Run one step
    pub fn step(&mut self, step: &Step) -> Result<(), ReplayError> {
        match step {
            Step::Type(text) => {
                for ch in text.chars() {
                    self.input(InputEvent::insert_text(ch.to_string()))?;
                }
            }
            Step::Key(name) => {
                let stroke = parse_key_string(name)?;
                let cmd = self.engine.on_key_stroke(stroke)?;
                let prevented = cmd.as_ref().is_some_and(Cmd::prevents_default);
                self.run(cmd);
                if !prevented {
                    self.key_default(stroke.key)?;
                }
            }
            Step::Select(index) => {
                // The list lives outside the surface but carries the ignore attribute
                let cmd = self.engine.on_blur_outside(true)?;
                self.run(cmd);
                let SessionState::Active { kind, .. } = self.engine.session_state() else {
                    tracing::warn!(index, "select without an active session");
                    return Ok(());
                };
                if let Some(menu) = self.menus.get(&kind) {
                    let item = menu.with_list(|list| list.items.get(*index).cloned());
                    if let Some(item) = item {
                        menu.select(&item);
                    }
                }
                let cmd = self.engine.settle()?;
                self.run(cmd);
            }
            Step::Paste(text) => {
                let cmd = self.engine.on_paste(text.as_str())?;
                self.run(cmd);
            }
            Step::Composition(text) => {
                let cmd = self.engine.on_composition_start()?;
                self.run(cmd);
                self.input(InputEvent::composition(text.as_str()))?;
                let cmd = self
                    .engine
                    .on_composition_end(InputEvent::composition(text.as_str()))?;
                self.run(cmd);
            }
            Step::Click => {
                let cmd = self.engine.on_click()?;
                self.run(cmd);
            }
            Step::Focus => {
                let cmd = self.engine.on_focus()?;
                self.run(cmd);
            }
            Step::Blur => {
                let cmd = self.engine.on_blur_outside(false)?;
                self.run(cmd);
            }
            Step::BlurIgnored => {
                let cmd = self.engine.on_blur_outside(true)?;
                self.run(cmd);
            }
            Step::Cancel => self.engine.cancel_signal()?,
        }
        Ok(())
    }

    pub fn outcome(&self) -> ReplayOutcome {
        let tokens = self
            .engine
            .surface()
            .map(|s| signal_tokens(&s.content))
            .unwrap_or_default();
        ReplayOutcome {
            html: self.engine.get_content(),
            tokens,
            state: self.engine.session_state(),
        }
    }

    /// Apply an edit to the surface, then report it to the engine
    fn input(&mut self, event: InputEvent) -> Result<(), ReplayError> {
        if let Some(surface) = self.engine.surface_mut() {
            event.apply_default(surface.content_mut());
        }
        let cmd = self.engine.on_input(event)?;
        self.run(cmd);
        Ok(())
    }

    /// Default surface behavior for keys the operator did not suppress
    fn key_default(&mut self, key: KeyCode) -> Result<(), ReplayError> {
        match key {
            KeyCode::Enter => self.input(InputEvent::line_break()),
            KeyCode::Backspace => self.input(InputEvent::delete_backward()),
            KeyCode::Delete => self.input(InputEvent::delete_forward()),
            KeyCode::Space => self.input(InputEvent::insert_text(" ")),
            KeyCode::Char(c) => self.input(InputEvent::insert_text(c.to_string())),
            KeyCode::Left | KeyCode::Right | KeyCode::Home | KeyCode::End => {
                if let Some(surface) = self.engine.surface_mut() {
                    move_caret(surface.content_mut(), key);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn run(&mut self, cmd: Option<Cmd>) {
        if let Some(cmd) = cmd {
            self.engine.run_cmd(&cmd);
        }
    }
}

/// Caret movement without an input event, like a real surface
fn move_caret(content: &mut EditableContent, key: KeyCode) {
    let Some(caret) = content.caret_offset() else {
        return;
    };
    let target = match key {
        KeyCode::Left => caret.saturating_sub(1),
        KeyCode::Right => (caret + 1).min(content.len_chars()),
        KeyCode::Home => 0,
        KeyCode::End => content.len_chars(),
        _ => caret,
    };
    let pos = content.position_at(target);
    content.collapse_to(pos);
}

/// Parse and run a whole script
pub fn run_script(config: SurfaceConfig, source: &str) -> Result<ReplayOutcome, ReplayError> {
    let script = ReplayScript::from_yaml(source)?;
    let mut host = ReplayHost::new(config, &script)?;
    for (index, raw) in script.steps.iter().enumerate() {
        let step = Step::try_from(raw.clone()).map_err(|message| ReplayError::Step { index, message })?;
        tracing::debug!(index, ?step, "replay step");
        host.step(&step)?;
    }
    Ok(host.outcome())
}
