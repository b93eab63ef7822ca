//! The Gatekeeper: the enforcement point in front of every capability.
//!
//! Callers (form renderer, form submit handler, CLI dispatcher, HTTP action
//! handler) ask the gatekeeper before exposing or executing anything.
//!
//! # Design Notes
//!
//! - **Per capability, not per request**: a form submission is checked at
//!   the page, then again for every submitted field. Passing the page check
//!   says nothing about any field.
//! - **One snapshot per request**: all checks of one request run against the
//!   same pinned grant set.
//! - **Decide before acting**: gated work is passed in as a closure and only
//!   runs after the decision is `Allowed`.
//! - **Pure**: a decision depends only on current grants, enablement and
//!   declarations. No history, no clock, no retries.

use std::sync::Arc;

use tollgate_capability::{Capability, Form};
use tollgate_core::{PermissionId, Principal};
use tollgate_grants::GrantView;

use crate::context::SecurityContext;
use crate::decision::{Decision, Denial, Gated};
use crate::error::Result;
use crate::form::{
    ConfigStore, ConfigValues, DropReason, DroppedField, RenderedField, RenderedForm, Submission,
    SubmitReport,
};
use crate::http::HttpGate;

/// Decides whether principals may see or use capabilities.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    context: Arc<SecurityContext>,
}

impl Gatekeeper {
    /// Create a gatekeeper over `context`.
    pub fn new(context: Arc<SecurityContext>) -> Self {
        Self { context }
    }

    /// The context decisions are made against.
    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    /// Decide whether `principal` may see or use `capability`.
    pub fn authorize(&self, principal: &Principal, capability: &Capability) -> Decision {
        let view = self.context.grants().view();
        self.decide(&view, principal, capability)
    }

    /// Decide by capability id.
    ///
    /// An undeclared id is a programming error and is reported as an error,
    /// not as a denial.
    pub fn authorize_id(&self, principal: &Principal, capability: &str) -> Result<Decision> {
        let capability = self.context.capabilities().resolve(capability)?;
        Ok(self.authorize(principal, capability))
    }

    /// Run `action` only if `principal` may use `capability`.
    pub fn run_action<R>(
        &self,
        principal: &Principal,
        capability: &Capability,
        action: impl FnOnce() -> R,
    ) -> Gated<R> {
        match self.authorize(principal, capability) {
            Decision::Allowed => Gated::Allowed(action()),
            Decision::Denied(denial) => {
                tracing::warn!(%principal, capability = %capability.id(), "action refused");
                Gated::Denied(denial)
            }
        }
    }

    /// Render the fields of `form` that `principal` may see.
    ///
    /// Denied at the page: nothing is loaded. Otherwise every field is
    /// checked on its own and denied fields are omitted.
    pub fn render_form(
        &self,
        principal: &Principal,
        form: &Form,
        store: &dyn ConfigStore,
    ) -> Result<Gated<RenderedForm>> {
        let view = self.context.grants().view();
        if let Decision::Denied(denial) = self.decide(&view, principal, form.page()) {
            return Ok(Gated::Denied(denial));
        }

        let mut values = store.load(form.id())?;
        let fields = form
            .fields()
            .iter()
            .filter(|field| self.decide(&view, principal, field.capability()).is_allowed())
            .map(|field| RenderedField {
                name: field.name().to_owned(),
                value: values.remove(field.name()),
            })
            .collect();

        Ok(Gated::Allowed(RenderedForm {
            form: form.id().clone(),
            fields,
        }))
    }

    /// Apply a submission of `form` by `principal`.
    ///
    /// Denied at the page: nothing is persisted. Otherwise each submitted
    /// field is checked again, whether or not it was ever rendered. Fields
    /// the principal may change are persisted; denied and undeclared fields
    /// are dropped without failing the submission. The decision rests on
    /// permission alone, so resubmitting a field's current value is dropped
    /// just like a changed one.
    pub fn submit_form(
        &self,
        principal: &Principal,
        form: &Form,
        submission: &Submission,
        store: &dyn ConfigStore,
    ) -> Result<Gated<SubmitReport>> {
        let view = self.context.grants().view();
        if let Decision::Denied(denial) = self.decide(&view, principal, form.page()) {
            return Ok(Gated::Denied(denial));
        }

        let mut report = SubmitReport::default();
        let mut changes = ConfigValues::new();

        for (name, value) in submission.iter() {
            let reason = match form.field(name) {
                None => DropReason::Undeclared,
                Some(field) => match self.decide(&view, principal, field.capability()) {
                    Decision::Allowed => {
                        changes.insert(name.to_owned(), value.clone());
                        report.persisted.push(name.to_owned());
                        continue;
                    }
                    Decision::Denied(_) => DropReason::Denied,
                },
            };

            tracing::warn!(%principal, form = %form.id(), field = name, ?reason, "submitted field dropped");
            report.dropped.push(DroppedField {
                name: name.to_owned(),
                reason,
            });
        }

        if !changes.is_empty() {
            store.persist(form.id(), changes)?;
        }
        Ok(Gated::Allowed(report))
    }

    /// HTTP status mapping over this gatekeeper.
    pub fn http(&self) -> HttpGate<'_> {
        HttpGate::new(self)
    }

    fn decide(&self, view: &GrantView<'_>, principal: &Principal, capability: &Capability) -> Decision {
        let required = capability.required();
        let allowed = view.holds(principal, required);

        tracing::debug!(
            %principal,
            capability = %capability.id(),
            kind = %capability.kind(),
            allowed,
            "authorization decision"
        );

        if allowed {
            return Decision::Allowed;
        }

        let required = view
            .registry()
            .id_of(required)
            .cloned()
            .unwrap_or_else(|| PermissionId::from_static("<unregistered>"));
        Decision::Denied(Denial {
            principal: principal.clone(),
            capability: capability.id().clone(),
            kind: capability.kind(),
            required,
        })
    }
}
