//! Configuration form values and the persistence collaborator.
//!
//! Tollgate does not own how configuration is stored. It reads current values
//! and writes accepted changes through a [`ConfigStore`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tollgate_capability::CapabilityId;

use crate::error::Result;

/// Field values of one form, keyed by field name.
pub type ConfigValues = BTreeMap<String, Value>;

/// Reads and writes the stored values of configuration forms.
pub trait ConfigStore: Send + Sync {
    /// Current values of `form`. Missing fields are simply absent.
    fn load(&self, form: &CapabilityId) -> Result<ConfigValues>;

    /// Merge `changes` into the stored values of `form`.
    fn persist(&self, form: &CapabilityId, changes: ConfigValues) -> Result<()>;
}

/// A field as shown to a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedField {
    pub name: String,
    pub value: Option<Value>,
}

/// The part of a form a principal is allowed to see.
///
/// Denied fields are absent, not disabled: neither their value nor their
/// existence is disclosed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedForm {
    pub form: CapabilityId,
    pub fields: Vec<RenderedField>,
}

impl RenderedForm {
    /// Look up a rendered field.
    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether `name` was rendered.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Names of the rendered fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

/// Submitted field values, keyed by field name.
///
/// A submission is untrusted: it may carry fields that were never rendered
/// or that the form does not declare at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission(ConfigValues);

impl Submission {
    /// An empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a submitted value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Iterate over submitted values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of submitted values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ConfigValues> for Submission {
    fn from(values: ConfigValues) -> Self {
        Self(values)
    }
}

impl From<RenderedForm> for Submission {
    /// Resubmit what was rendered, as a browser would.
    fn from(form: RenderedForm) -> Self {
        Self(
            form.fields
                .into_iter()
                .filter_map(|field| field.value.map(|value| (field.name, value)))
                .collect(),
        )
    }
}

/// Why a submitted field was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// The principal lacks the field's required permission.
    Denied,

    /// The form declares no such field.
    Undeclared,
}

/// A submitted field that was silently discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedField {
    pub name: String,
    pub reason: DropReason,
}

/// What happened to an accepted submission.
///
/// The submitter sees success either way; `dropped` is for the caller's
/// audit trail, not for the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReport {
    pub persisted: Vec<String>,
    pub dropped: Vec<DroppedField>,
}

impl SubmitReport {
    /// Whether `name` was persisted.
    pub fn persisted(&self, name: &str) -> bool {
        self.persisted.iter().any(|field| field == name)
    }

    /// Whether `name` was dropped.
    pub fn dropped(&self, name: &str) -> bool {
        self.dropped.iter().any(|field| field.name == name)
    }
}
