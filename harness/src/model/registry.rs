//! Typed field registry.
//!
//! Replaces reflection-based field discovery with an explicit per-model
//! registry mapping declared names to typed accessor pairs. A concrete
//! model builds one registry over its state struct and delegates
//! `bind_field` / `read_result` / `field_kind` to it; the coercion rules
//! live here in one place:
//!
//! - string fields store the value as-is
//! - integer/double fields go through numeric parse (integers accept a
//!   double literal, truncated)
//! - boolean fields accept leading `0`/`1` as false/true in addition to
//!   `true`/`false`
//! - character fields take the first character
//!
//! Before coercion every bound value is re-attempted as a distribution
//! code against the provided stream, so any bound value may itself be a
//! draw instruction applied per binding.

use crate::model::{BindOutcome, EdgeRecord, FieldKind};
use crate::rng::RngManager;
use crate::sampler;

type Setter<S> = Box<dyn Fn(&mut S, &str) -> bool>;
type Getter<S> = Box<dyn Fn(&S) -> String>;
type EdgeGetter<S> = Box<dyn Fn(&S) -> Vec<EdgeRecord>>;

struct FieldEntry<S> {
    name: String,
    kind: FieldKind,
    set: Option<Setter<S>>,
    get: Option<Getter<S>>,
    edges: Option<EdgeGetter<S>>,
}

/// Ordered registry of a model's declared fields over its state type `S`.
///
/// Declaration order is preserved: template generation lists fields in
/// the order they were registered.
pub struct FieldRegistry<S> {
    entries: Vec<FieldEntry<S>>,
}

impl<S> Default for FieldRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FieldRegistry<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(mut self, entry: FieldEntry<S>) -> Self {
        debug_assert!(
            !self.entries.iter().any(|e| e.name == entry.name),
            "duplicate field name {}",
            entry.name
        );
        self.entries.push(entry);
        self
    }

    /// Register a string field.
    pub fn string(
        self,
        name: &str,
        get: impl Fn(&S) -> String + 'static,
        set: impl Fn(&mut S, String) + 'static,
    ) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Str,
            set: Some(Box::new(move |s, v| {
                set(s, v.to_string());
                true
            })),
            get: Some(Box::new(move |s| get(s))),
            edges: None,
        })
    }

    /// Register an integer field. Accepts a double literal, truncated.
    pub fn int(
        self,
        name: &str,
        get: impl Fn(&S) -> i64 + 'static,
        set: impl Fn(&mut S, i64) + 'static,
    ) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Int,
            set: Some(Box::new(move |s, v| match v.parse::<f64>() {
                Ok(x) => {
                    set(s, x as i64);
                    true
                }
                Err(_) => false,
            })),
            get: Some(Box::new(move |s| get(s).to_string())),
            edges: None,
        })
    }

    /// Register a floating-point field.
    pub fn double(
        self,
        name: &str,
        get: impl Fn(&S) -> f64 + 'static,
        set: impl Fn(&mut S, f64) + 'static,
    ) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Double,
            set: Some(Box::new(move |s, v| match v.parse::<f64>() {
                Ok(x) => {
                    set(s, x);
                    true
                }
                Err(_) => false,
            })),
            get: Some(Box::new(move |s| get(s).to_string())),
            edges: None,
        })
    }

    /// Register a boolean field. `0`/`1` map to false/true; anything
    /// else other than (case-insensitive) `true` reads as false.
    pub fn boolean(
        self,
        name: &str,
        get: impl Fn(&S) -> bool + 'static,
        set: impl Fn(&mut S, bool) + 'static,
    ) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Bool,
            set: Some(Box::new(move |s, v| {
                let parsed = match v.chars().next() {
                    Some('0') => false,
                    Some('1') => true,
                    _ => v.eq_ignore_ascii_case("true"),
                };
                set(s, parsed);
                true
            })),
            get: Some(Box::new(move |s| get(s).to_string())),
            edges: None,
        })
    }

    /// Register a character field. Takes the first character of the
    /// bound value; an empty value is a coercion failure.
    pub fn character(
        self,
        name: &str,
        get: impl Fn(&S) -> char + 'static,
        set: impl Fn(&mut S, char) + 'static,
    ) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Char,
            set: Some(Box::new(move |s, v| match v.chars().next() {
                Some(c) => {
                    set(s, c);
                    true
                }
                None => false,
            })),
            get: Some(Box::new(move |s| get(s).to_string())),
            edges: None,
        })
    }

    /// Register a list-valued result field (read-only). The getter
    /// returns the flattened textual sequence, typically via
    /// [`join_list`].
    pub fn list(self, name: &str, get: impl Fn(&S) -> String + 'static) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::List,
            set: None,
            get: Some(Box::new(move |s| get(s))),
            edges: None,
        })
    }

    /// Register a network field exported as an edge list.
    pub fn network(self, name: &str, edges: impl Fn(&S) -> Vec<EdgeRecord> + 'static) -> Self {
        self.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Network,
            set: None,
            get: None,
            edges: Some(Box::new(edges)),
        })
    }

    /// Kind of a registered field, [`FieldKind::Unknown`] if absent.
    pub fn kind(&self, name: &str) -> FieldKind {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.kind)
            .unwrap_or(FieldKind::Unknown)
    }

    /// Names of every non-network field, in registration order. These
    /// are the template's settable/collectable suggestions.
    pub fn template_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.kind != FieldKind::Network)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Names of the registered network fields, in registration order.
    pub fn network_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.kind == FieldKind::Network)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Bind a textual value onto a named field.
    ///
    /// Re-attempts the value as a distribution code first; a finite draw
    /// replaces the text before coercion. Fields without a setter
    /// (lists, networks) report [`BindOutcome::UnknownField`] so the
    /// model may still handle the name manually.
    pub fn bind(
        &self,
        state: &mut S,
        name: &str,
        value: &str,
        rng: &mut RngManager,
    ) -> BindOutcome {
        let entry = match self.entries.iter().find(|e| e.name == name) {
            Some(e) => e,
            None => return BindOutcome::UnknownField,
        };
        let set = match &entry.set {
            Some(set) => set,
            None => return BindOutcome::UnknownField,
        };

        let draw = sampler::sample(value, rng);
        let resolved;
        let value = if draw.is_nan() {
            value
        } else {
            resolved = draw.to_string();
            &resolved
        };

        if set(state, value) {
            BindOutcome::Bound
        } else {
            BindOutcome::CoercionFailed
        }
    }

    /// Read a registered field as a string. `None` when the name is
    /// unregistered or write-only.
    pub fn read(&self, state: &S, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.get.as_ref())
            .map(|get| get(state))
    }

    /// Current edges of a registered network field.
    pub fn read_edges(&self, state: &S, name: &str) -> Option<Vec<EdgeRecord>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.edges.as_ref())
            .map(|edges| edges(state))
    }
}

/// Serialize a slice as a flattened textual sequence (space-separated).
pub fn join_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
