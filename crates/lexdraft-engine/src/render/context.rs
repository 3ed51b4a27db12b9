//! Render contexts and default injection
//!
//! A context maps variable names to JSON values. Documents carry two
//! conventional variables, `title` and `date`, that most templates expect;
//! their defaults are described by [`ContextDefaults`] and resolved into
//! the context exactly once, before the renderer runs. Call sites never
//! probe for individual keys themselves.

use std::collections::HashMap;

use chrono::{FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;

/// Context key for the document title default.
pub const TITLE_VAR: &str = "title";
/// Context key for the generation date default.
pub const DATE_VAR: &str = "date";

/// Business-locale offset for injected dates, in hours east of UTC.
/// Generated documents carry the business day, never the host timezone's.
pub const BUSINESS_UTC_OFFSET_HOURS: i32 = -5;

/// The business locale as a chrono offset.
pub fn business_offset() -> FixedOffset {
    // The constant is a compile-time choice well inside chrono's range.
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_HOURS * 3600).expect("offset within chrono range")
}

/// Today's date in the business locale, formatted `YYYY-MM-DD`.
pub fn business_today() -> String {
    Utc::now()
        .with_timezone(&business_offset())
        .format("%Y-%m-%d")
        .to_string()
}

/// Variable values for one rendering call. Values are JSON-typed; strings,
/// numbers, booleans and nulls all occur in practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    vars: HashMap<String, Value>,
}

impl RenderContext {
    pub fn new() -> RenderContext {
        RenderContext::default()
    }

    pub fn from_vars(vars: HashMap<String, Value>) -> RenderContext {
        RenderContext { vars }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Key presence, not value truthiness: an explicit `null` counts as
    /// present and blocks default injection.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// Resolves `defaults` into the context. Called once per operation,
    /// before the renderer.
    pub fn apply_defaults(&mut self, defaults: &ContextDefaults) {
        if let Some(title) = &defaults.title {
            if !self.contains(TITLE_VAR) {
                self.set(TITLE_VAR, title.clone());
            }
        }
        if !self.contains(DATE_VAR) {
            let date = defaults.date.clone().unwrap_or_else(business_today);
            self.set(DATE_VAR, date);
        }
    }
}

/// Declarative defaults for one rendering call.
#[derive(Debug, Clone, Default)]
pub struct ContextDefaults {
    /// Injected under `title` when the context has no such key. Single
    /// document generation passes the intended document title; batch runs
    /// leave it unset, so batch contexts never gain a title.
    pub title: Option<String>,
    /// Injected under `date` when the context has no such key. Unset means
    /// today's date in the business locale
    /// ([`BUSINESS_UTC_OFFSET_HOURS`]); tests pin a fixed date here.
    pub date: Option<String>,
}

impl ContextDefaults {
    pub fn for_document(title: impl Into<String>) -> ContextDefaults {
        ContextDefaults {
            title: Some(title.into()),
            date: None,
        }
    }

    pub fn for_batch() -> ContextDefaults {
        ContextDefaults::default()
    }
}
