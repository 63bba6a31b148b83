//! Per-surface operator registry

use std::collections::HashMap;

use thiserror::Error;

use super::operator::SignalOperatorDefinition;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("trigger '{signal}' is already registered by operator '{existing}'")]
    DuplicateTrigger { signal: char, existing: String },
    #[error("operator type '{kind}' is already registered")]
    DuplicateKind { kind: String },
}

/// Operator definitions keyed by type name, plus a trigger → type index.
///
/// Append-only: there is no removal, and a failed registration leaves the
/// registry untouched.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    by_kind: HashMap<String, SignalOperatorDefinition>,
    by_signal: HashMap<char, String>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator definition
    pub fn register(&mut self, def: SignalOperatorDefinition) -> Result<(), RegistryError> {
        if let Some(existing) = self.by_signal.get(&def.signal()) {
            return Err(RegistryError::DuplicateTrigger {
                signal: def.signal(),
                existing: existing.clone(),
            });
        }
        if self.by_kind.contains_key(def.kind()) {
            return Err(RegistryError::DuplicateKind {
                kind: def.kind().to_string(),
            });
        }

        tracing::debug!(kind = def.kind(), signal = %def.signal(), "registered signal operator");
        self.by_signal.insert(def.signal(), def.kind().to_string());
        self.by_kind.insert(def.kind().to_string(), def);
        Ok(())
    }

    /// Definition registered for a trigger character
    pub fn lookup_by_trigger(&self, signal: char) -> Option<&SignalOperatorDefinition> {
        self.by_signal
            .get(&signal)
            .and_then(|kind| self.by_kind.get(kind))
    }

    /// Definition registered under a type name
    pub fn lookup_by_type(&self, kind: &str) -> Option<&SignalOperatorDefinition> {
        self.by_kind.get(kind)
    }

    pub(crate) fn lookup_by_type_mut(&mut self, kind: &str) -> Option<&mut SignalOperatorDefinition> {
        self.by_kind.get_mut(kind)
    }

    /// Whether `signal` is a registered trigger
    pub fn is_trigger(&self, signal: char) -> bool {
        self.by_signal.contains_key(&signal)
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
