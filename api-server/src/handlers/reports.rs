//! Reports handlers
//!
//! Every request re-reads the stored tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use student_analytics_core::logic::query;
use student_analytics_core::{PipelineResult, PredictedRecord, RuleRecord, TableStore};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub performance_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Deserialize)]
pub struct RulesQuery {
    /// Decimal places for support, confidence and lift
    pub round: Option<u32>,
}

/// Run a store read on the blocking pool
async fn read_with<T, F>(state: &AppState, read: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TableStore) -> PipelineResult<T> + Send + 'static,
{
    let store: Arc<dyn TableStore> = state.store.clone();
    let result = tokio::task::spawn_blocking(move || read(store.as_ref())).await?;
    Ok(result?)
}

/// Predicted performance distribution
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<SummaryResponse>> {
    let rows = read_with(&state, query::load_predictions).await?;

    Ok(Json(SummaryResponse {
        performance_distribution: query::performance_distribution(&rows),
    }))
}

/// Students predicted Low
pub async fn at_risk(State(state): State<AppState>) -> AppResult<Json<Vec<PredictedRecord>>> {
    let rows = read_with(&state, query::load_predictions).await?;
    Ok(Json(query::at_risk(rows)))
}

pub async fn students(State(state): State<AppState>) -> AppResult<Json<Vec<PredictedRecord>>> {
    let rows = read_with(&state, query::load_predictions).await?;
    Ok(Json(rows))
}

pub async fn student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> AppResult<Json<PredictedRecord>> {
    let rows = read_with(&state, query::load_predictions).await?;

    query::find_student(&rows, &student_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", student_id)))
}

pub async fn rules(
    State(state): State<AppState>,
    Query(params): Query<RulesQuery>,
) -> AppResult<Json<Vec<RuleRecord>>> {
    let rules = read_with(&state, query::load_rules).await?;

    let rules = match params.round {
        Some(places) => rules.iter().map(|r| r.rounded(places)).collect(),
        None => rules,
    };

    Ok(Json(rules))
}
