//! API router.
//!
//! Layers (outermost first): CORS, then request tracing.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints::{
    advisory, appointments, consents, doctors, goals, health, patients, records, vaccines,
    visual_insights,
};
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the complete API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let analysis = Router::new()
        .route("/analyze", post(advisory::consent_analysis))
        .route("/analyze/consent-analysis", post(advisory::consent_analysis))
        .route("/api/insights", post(advisory::insights))
        .route("/api/preventive-advice", post(advisory::preventive_advice))
        .route("/api/vaccine-advisor", post(advisory::vaccine_advisor))
        .route("/api/visual-insights", post(visual_insights::build))
        .route("/api/health", get(health::check));

    let patient_routes = Router::new()
        .route("/", get(patients::lookup).post(patients::upsert))
        .route("/:patient_id", get(patients::get))
        .route(
            "/:patient_id/records",
            get(records::list).post(records::upload),
        )
        .route(
            "/:patient_id/records/:record_id",
            get(records::get).delete(records::remove),
        )
        .route(
            "/:patient_id/consents",
            get(consents::list).post(consents::create),
        )
        .route(
            "/:patient_id/consents/:consent_id/respond",
            post(consents::respond),
        )
        .route(
            "/:patient_id/consents/:consent_id/analyze",
            post(consents::analyze),
        )
        .route(
            "/:patient_id/goals",
            get(goals::list).post(goals::add).delete(goals::remove_all),
        )
        .route(
            "/:patient_id/goals/:goal_id",
            patch(goals::set_done).delete(goals::remove),
        )
        .route(
            "/:patient_id/vaccines",
            get(vaccines::list).post(vaccines::add),
        )
        .route(
            "/:patient_id/vaccines/:vaccine_id",
            axum::routing::delete(vaccines::remove),
        );

    let doctor_routes = Router::new()
        .route("/", post(doctors::upsert))
        .route("/:doctor_id", get(doctors::get))
        .route(
            "/:doctor_id/patients/:patient_id/records",
            get(doctors::patient_records),
        )
        .route(
            "/:doctor_id/patients/:patient_id/goals",
            get(doctors::patient_goals).post(doctors::add_patient_goal),
        )
        .route(
            "/:doctor_id/patients/:patient_id/goals/:goal_id",
            patch(doctors::set_patient_goal_done).delete(doctors::remove_patient_goal),
        );

    let appointment_routes = Router::new().route(
        "/",
        get(appointments::list).post(appointments::book),
    );

    Router::new()
        .merge(analysis)
        .nest("/api/patients", patient_routes)
        .nest("/api/doctors", doctor_routes)
        .nest("/api/appointments", appointment_routes)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
