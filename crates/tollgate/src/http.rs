//! HTTP status mapping for gated pages, form submissions and actions.
//!
//! A denial at the page or action level is a 403. Field-level denials never
//! change the status; they only change which fields are present or
//! persisted.

use http::StatusCode;

use tollgate_capability::{Capability, Form};
use tollgate_core::Principal;

use crate::decision::{Decision, Denial, Gated};
use crate::error::Result;
use crate::form::{ConfigStore, RenderedForm, Submission, SubmitReport};
use crate::gatekeeper::Gatekeeper;

/// A status plus an optional body, ready for a web framework to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse<T> {
    pub status: StatusCode,
    pub body: Option<T>,
    pub denial: Option<Denial>,
}

impl<T> HttpResponse<T> {
    fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            denial: None,
        }
    }

    fn forbidden(denial: Denial) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: None,
            denial: Some(denial),
        }
    }

    fn failed() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: None,
            denial: None,
        }
    }

    fn from_gated(gated: Gated<T>) -> Self {
        match gated {
            Gated::Allowed(body) => Self::ok(body),
            Gated::Denied(denial) => Self::forbidden(denial),
        }
    }
}

/// Status for a bare decision.
pub fn status_for(decision: &Decision) -> StatusCode {
    match decision {
        Decision::Allowed => StatusCode::OK,
        Decision::Denied(_) => StatusCode::FORBIDDEN,
    }
}

/// HTTP-facing wrapper around a [`Gatekeeper`].
#[derive(Debug, Clone, Copy)]
pub struct HttpGate<'g> {
    gatekeeper: &'g Gatekeeper,
}

impl<'g> HttpGate<'g> {
    pub(crate) fn new(gatekeeper: &'g Gatekeeper) -> Self {
        Self { gatekeeper }
    }

    /// Serve a configuration page.
    pub fn serve_page(
        &self,
        principal: &Principal,
        form: &Form,
        store: &dyn ConfigStore,
    ) -> Result<HttpResponse<RenderedForm>> {
        let rendered = self.gatekeeper.render_form(principal, form, store)?;
        Ok(HttpResponse::from_gated(rendered))
    }

    /// Serve a configuration form submission.
    ///
    /// Dropped fields are invisible here: an accepted submission is a 200
    /// regardless of how many of its fields were persisted.
    pub fn serve_form_submit(
        &self,
        principal: &Principal,
        form: &Form,
        submission: &Submission,
        store: &dyn ConfigStore,
    ) -> Result<HttpResponse<SubmitReport>> {
        let report = self.gatekeeper.submit_form(principal, form, submission, store)?;
        Ok(HttpResponse::from_gated(report))
    }

    /// Serve an action endpoint. A failing action is a 500.
    pub fn serve_action<T, E>(
        &self,
        principal: &Principal,
        capability: &Capability,
        action: impl FnOnce() -> std::result::Result<T, E>,
    ) -> HttpResponse<T>
    where
        E: std::fmt::Display,
    {
        match self.gatekeeper.run_action(principal, capability, action) {
            Gated::Allowed(Ok(body)) => HttpResponse::ok(body),
            Gated::Allowed(Err(err)) => {
                tracing::error!(%principal, capability = %capability.id(), error = %err, "action failed");
                HttpResponse::failed()
            }
            Gated::Denied(denial) => HttpResponse::forbidden(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tollgate_capability::{Component, Declarations};
    use tollgate_grants::GrantSet;

    use crate::config::TollgateConfig;
    use crate::context::SecurityContext;

    struct Diagnostics;

    impl Component for Diagnostics {
        fn name(&self) -> &str {
            "diagnostics"
        }

        fn declare(&self, decl: &mut Declarations<'_>) -> tollgate_capability::Result<()> {
            decl.action("computer.dumpExportTable")?;
            Ok(())
        }
    }

    fn gatekeeper() -> Gatekeeper {
        let context = SecurityContext::builder(TollgateConfig::default().with_manage_permission(true))
            .component(Diagnostics)
            .build()
            .unwrap();
        let perms = context.standard();
        context
            .replace_grants(
                GrantSet::builder()
                    .grant([perms.administer])
                    .to("admin")
                    .grant([perms.manage, perms.read])
                    .to("manager")
                    .build(),
            )
            .unwrap();
        Gatekeeper::new(Arc::new(context))
    }

    #[test]
    fn test_status_for_decision() {
        let gk = gatekeeper();
        let export = gk.context().capabilities().get("computer.dumpExportTable").unwrap();

        assert_eq!(status_for(&gk.authorize(&Principal::from("admin"), export)), StatusCode::OK);
        assert_eq!(
            status_for(&gk.authorize(&Principal::from("manager"), export)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_serve_action_statuses() {
        let gk = gatekeeper();
        let export = gk.context().capabilities().get("computer.dumpExportTable").unwrap().clone();
        let http = gk.http();

        let ok = http.serve_action(&Principal::from("admin"), &export, || Ok::<_, String>("table"));
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body, Some("table"));

        let failed =
            http.serve_action(&Principal::from("admin"), &export, || Err::<(), _>("channel closed"));
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);

        let denied = http.serve_action(&Principal::from("manager"), &export, || Ok::<_, String>("table"));
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
        assert!(denied.body.is_none());
        assert_eq!(denied.denial.unwrap().required.as_str(), "overall.administer");
    }
}
