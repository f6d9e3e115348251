//! Persona enumeration endpoint

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::persona::ALL_PERSONAS;

/// One persona entry in the selector menu
#[derive(Debug, Serialize)]
pub struct PersonaEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// List the available personas in menu order
async fn list_personas() -> Json<Vec<PersonaEntry>> {
    Json(
        ALL_PERSONAS
            .into_iter()
            .map(|p| PersonaEntry {
                id: p.id(),
                label: p.label(),
                icon: p.icon(),
            })
            .collect(),
    )
}

/// Build personas router
#[must_use]
pub fn router() -> Router {
    Router::new().route("/personas", get(list_personas))
}
