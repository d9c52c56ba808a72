//! Visit recording and the page-load visitor gate.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::auth::SessionService;
use crate::application::repos::{QrCodesRepo, RecordVisitParams, RepoError, VisitsRepo};
use crate::domain::entities::LandingPageViewRecord;
use crate::domain::types::{QrTargetKind, VisitSource};
use crate::domain::visit::{CachedSession, GateState, Transition, VisitGate, VisitOrigin};

#[derive(Debug, Error)]
pub enum VisitError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct VisitService {
    visits: Arc<dyn VisitsRepo>,
    qr_codes: Arc<dyn QrCodesRepo>,
}

impl VisitService {
    pub fn new(visits: Arc<dyn VisitsRepo>, qr_codes: Arc<dyn QrCodesRepo>) -> Self {
        Self { visits, qr_codes }
    }

    /// Upsert the `(user, page)` visit row.
    ///
    /// A QR origin only counts when the code points at this page; anything
    /// else is recorded as a direct visit.
    pub async fn record(
        &self,
        user_id: Uuid,
        landing_page_id: Uuid,
        origin: VisitOrigin,
        now: OffsetDateTime,
    ) -> Result<LandingPageViewRecord, VisitError> {
        let origin = self.checked_origin(landing_page_id, origin).await;
        let record = self
            .visits
            .upsert_visit(RecordVisitParams {
                user_id,
                landing_page_id,
                source: origin.source,
                qr_code_id: origin.qr_code_id,
                visited_at: now,
            })
            .await?;

        if origin.source == VisitSource::QrScan
            && let Some(qr_code_id) = origin.qr_code_id
            && let Err(err) = self.qr_codes.increment_view_count(qr_code_id).await
        {
            warn!(
                target = "brandpage::application::visits",
                qr_code_id = %qr_code_id,
                error = %err,
                "failed to bump qr view count"
            );
        }

        counter!(
            "brandpage_visits_recorded_total",
            "source" => origin.source.as_str()
        )
        .increment(1);

        debug!(
            target = "brandpage::application::visits",
            user_id = %user_id,
            landing_page_id = %landing_page_id,
            visit_count = record.visit_count,
            "visit recorded"
        );

        Ok(record)
    }

    async fn checked_origin(&self, landing_page_id: Uuid, origin: VisitOrigin) -> VisitOrigin {
        if origin.source != VisitSource::QrScan {
            return origin;
        }
        let Some(qr_code_id) = origin.qr_code_id else {
            return VisitOrigin::direct();
        };

        match self.qr_codes.find_qr_code(qr_code_id).await {
            Ok(Some(code))
                if code.target_kind == QrTargetKind::LandingPage
                    && code.landing_page_id == Some(landing_page_id) =>
            {
                origin
            }
            Ok(_) => {
                debug!(
                    target = "brandpage::application::visits",
                    qr_code_id = %qr_code_id,
                    landing_page_id = %landing_page_id,
                    "qr code does not target this page"
                );
                VisitOrigin::direct()
            }
            Err(err) => {
                warn!(
                    target = "brandpage::application::visits",
                    qr_code_id = %qr_code_id,
                    error = %err,
                    "failed to load qr code for visit"
                );
                VisitOrigin::direct()
            }
        }
    }

    pub async fn list_views(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<LandingPageViewRecord>, VisitError> {
        self.visits
            .list_views(landing_page_id)
            .await
            .map_err(VisitError::from)
    }
}

/// What the gate knows about the visitor from cookies and the query string.
#[derive(Debug, Clone)]
pub struct GateInputs {
    pub cached: Option<CachedSession>,
    pub skip_until: Option<OffsetDateTime>,
    pub origin: VisitOrigin,
}

/// Runs the visitor gate for one page and records visits on authentication.
#[derive(Clone)]
pub struct VisitTracker {
    sessions: SessionService,
    visits: VisitService,
}

impl VisitTracker {
    pub fn new(sessions: SessionService, visits: VisitService) -> Self {
        Self { sessions, visits }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn visits(&self) -> &VisitService {
        &self.visits
    }

    /// Evaluate the gate for a fresh page load and return the settled state.
    ///
    /// Visits are recorded for the user the session store returns, never for
    /// the user id carried in the cookie.
    pub async fn on_page_load(
        &self,
        landing_page_id: Uuid,
        inputs: &GateInputs,
        now: OffsetDateTime,
    ) -> GateState {
        let mut gate = VisitGate::new();
        gate.observe_cached(inputs.cached.as_ref(), now);

        if let Some(transition) = self.check_remote(&mut gate, inputs, now).await {
            self.apply(landing_page_id, inputs.origin, transition, now)
                .await;
        }

        gate.state()
    }

    /// Re-run the remote check against an existing gate.
    ///
    /// A failed check leaves an optimistic `Authenticated` state untouched;
    /// from `Loading` it falls back to the unauthenticated states.
    pub async fn check_remote(
        &self,
        gate: &mut VisitGate,
        inputs: &GateInputs,
        now: OffsetDateTime,
    ) -> Option<Transition> {
        let verified = match inputs.cached.as_ref() {
            Some(cached) => match self.sessions.verify(&cached.token, now).await {
                Ok(user) => user,
                Err(err) => {
                    warn!(
                        target = "brandpage::application::visits",
                        error = %err,
                        "remote session check failed"
                    );
                    if matches!(gate.state(), GateState::Authenticated { .. }) {
                        return None;
                    }
                    None
                }
            },
            None => None,
        };

        gate.observe_remote(verified, inputs.skip_until, now)
    }

    /// Record the visit requested by a transition. Failures are logged.
    pub async fn apply(
        &self,
        landing_page_id: Uuid,
        origin: VisitOrigin,
        transition: Transition,
        now: OffsetDateTime,
    ) {
        let Some(user_id) = transition.record_visit else {
            return;
        };

        if let Err(err) = self.visits.record(user_id, landing_page_id, origin, now).await {
            warn!(
                target = "brandpage::application::visits",
                landing_page_id = %landing_page_id,
                error = %err,
                "failed to record visit"
            );
        }
    }
}
