//! API handlers for the ClauseCheck server
//!
//! Provides REST endpoints for:
//! - Document analysis (multipart upload or raw text)
//! - Clause category listing
//! - Health checks

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shared_types::{AnalysisReport, RiskLevel, Severity, TierCounts};

use crate::error::ServerError;
use crate::extract::extract_text;
use crate::summarize;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "clausecheck-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Category list response
#[derive(Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub categories: Vec<CategoryInfo>,
    pub count: usize,
}

/// Clause category metadata
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub weight: f64,
    pub explanation: String,
    pub rule_count: usize,
}

/// Handler: GET /api/categories
pub async fn handle_list_categories(State(state): State<AppState>) -> Json<CategoryListResponse> {
    let categories: Vec<CategoryInfo> = state
        .engine
        .taxonomy()
        .categories()
        .iter()
        .map(|c| CategoryInfo {
            id: c.id.to_string(),
            name: c.name.to_string(),
            severity: c.tier,
            weight: c.weight,
            explanation: c.explanation.to_string(),
            rule_count: c.rules().len(),
        })
        .collect();

    let count = categories.len();

    Json(CategoryListResponse {
        success: true,
        categories,
        count,
    })
}

/// Analyze-text request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    /// Raw document text to analyze
    pub text: String,

    /// Optional display name for the document
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Analysis response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub document_id: String,
    pub file_name: Option<String>,
    /// Overall risk score on a 0-100 scale
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub tier_counts: TierCounts,
    pub clauses: Vec<ClauseInfo>,
    pub extracted_text: String,
    /// Null when the summarization service failed, timed out, or is not
    /// configured
    pub summary: Option<String>,
    pub advisory: String,
    pub analyzed_at: u64,
}

/// Per-category finding details
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseInfo {
    pub id: String,
    pub name: String,
    pub present: bool,
    pub confidence: f64,
    pub severity: Severity,
    pub explanation: String,
    pub evidence: Vec<String>,
}

/// Handler: POST /api/analyze (multipart file upload)
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::InvalidRequest(format!("invalid multipart payload: {err}")))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ServerError::InvalidRequest(format!("could not read upload: {err}")))?;
            file_bytes = Some(bytes.to_vec());
        }
    }

    let bytes = file_bytes
        .ok_or_else(|| ServerError::InvalidRequest("missing 'file' field".to_string()))?;
    let name = file_name.unwrap_or_else(|| "upload".to_string());

    info!(file = %name, size = bytes.len(), "analyze request");

    let raw_text = {
        let name = name.clone();
        tokio::task::spawn_blocking(move || extract_text(&bytes, &name))
            .await
            .map_err(|err| ServerError::Internal(err.to_string()))??
    };

    run_pipeline(&state, Some(name), raw_text).await
}

/// Handler: POST /api/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    info!(chars = req.text.len(), "analyze-text request");
    run_pipeline(&state, req.file_name, req.text).await
}

/// Shared pipeline: detection/scoring and summarization branch off the same
/// text and run concurrently; the report waits on both. A summarizer failure
/// or timeout degrades to `summary: null`, never to an error.
async fn run_pipeline(
    state: &AppState,
    file_name: Option<String>,
    raw_text: String,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let document_id = Uuid::new_v4().to_string();

    let engine = state.engine.clone();
    let assess_text = raw_text.clone();
    let assess = tokio::task::spawn_blocking(move || engine.assess(&assess_text));

    let summary_branch = async {
        match &state.summarizer {
            Some(summarizer) => {
                summarize::bounded(state.summary_timeout_ms, summarizer.summarize(&raw_text)).await
            }
            None => None,
        }
    };

    let (assess_result, summary) = tokio::join!(assess, summary_branch);
    let assessment = assess_result.map_err(|err| ServerError::Internal(err.to_string()))??;

    let report = risk_engine::assemble(&raw_text, assessment, summary);
    Ok(Json(build_response(state, document_id, file_name, report)))
}

fn build_response(
    state: &AppState,
    document_id: String,
    file_name: Option<String>,
    report: AnalysisReport,
) -> AnalyzeResponse {
    let taxonomy = state.engine.taxonomy();

    let clauses: Vec<ClauseInfo> = report
        .assessment
        .findings
        .iter()
        .map(|f| ClauseInfo {
            id: f.category_id.clone(),
            name: f.category_name.clone(),
            present: f.present,
            confidence: f.confidence,
            severity: f.severity,
            explanation: taxonomy
                .get(&f.category_id)
                .map(|c| c.explanation.to_string())
                .unwrap_or_default(),
            evidence: f.evidence.iter().map(|e| e.text.clone()).collect(),
        })
        .collect();

    AnalyzeResponse {
        success: true,
        document_id,
        file_name,
        risk_score: report.assessment.score,
        risk_level: report.assessment.level,
        tier_counts: report.assessment.tier_counts,
        clauses,
        extracted_text: report.extracted_text,
        summary: report.summary,
        advisory: report.advisory,
        analyzed_at: chrono::Utc::now().timestamp() as u64,
    }
}
