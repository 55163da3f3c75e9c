//! Fact engine: batched claim selection and claim verification.
//!
//! Selection is request-driven (one call per drained sentence batch) and
//! feeds the claim queue. Verification runs the three-step pipeline per
//! claim: optimize a search query, retrieve filtered evidence, judge the
//! claim against it. A step failure terminates that claim with no result and
//! no retry; the stream's freshness is worth more than a late verdict.

mod worker;

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{LlmCallSettings, LlmSettings, SearchSettings};
use crate::errors::{EngineError, EngineResult};
use crate::events::{EventSink, Notification};
use crate::providers::{
    CompletionRequest, LanguageModel, SearchHit, SearchOptions, TextSearch,
};
use crate::state::{FactResult, StateCore, Verdict};
use crate::utils::{epoch_millis, parse_json_response, HostBlocklist};

pub use worker::FactWorker;

// =============================================================================
// Prompts
// =============================================================================

const SELECTION_SYSTEM_PROMPT: &str =
    "You are a claim selection assistant. Always respond in valid JSON format.";

fn selection_prompt(text: &str, max_claims: usize) -> String {
    format!(
        r#"You are selecting factual claims worth verifying from a live conversation.

Recent statements: "{text}"

Select up to {max_claims} claims that are:
- Statements about objective reality (dates, numbers, events, scientific facts)
- Verifiable through a web search, with enough context to stand alone
- NOT opinions, questions, greetings, hypotheticals, vague statements, or fragments

Selecting nothing is a valid outcome when no statement qualifies.

Respond in JSON format:
{{
    "selected_claims": [
        {{"claim": "self-contained claim text", "reason": "why it is worth verifying"}}
    ]
}}
"#
    )
}

const QUERY_SYSTEM_PROMPT: &str = "You are a search query optimization assistant.";

fn query_prompt(claim: &str) -> String {
    format!(
        r#"Convert this claim into an optimized web search query.

Claim: {claim}

Instructions:
1. Extract the CORE FACTUAL ASSERTION (remove filler, opinions, context)
2. Identify KEY ENTITIES (names, organizations, places, numbers, dates)
3. Create a concise search query (3-8 words) that will find relevant evidence

Examples:
- Claim: "eighty percent not maybe ninety percent of the funding goes to the democrats"
  Query: "political funding distribution democrats republicans percentage"

- Claim: "ninety percent of the money is going to your opponents"
  Query: "campaign finance political party funding distribution"

Output ONLY the search query, nothing else."#
    )
}

const VERIFICATION_SYSTEM_PROMPT: &str =
    "You are a fact-checking assistant. Always respond in valid JSON format.";

fn verification_prompt(claim: &str, evidence: &str) -> String {
    format!(
        r#"You are a fact-checking assistant verifying claims against evidence.

CLAIM: "{claim}"

EVIDENCE FROM WEB SEARCH:
{evidence}

Your task: Determine if the claim is supported, refuted, or uncertain based on the evidence.

Respond in JSON format:
{{
    "verdict": "SUPPORTED" | "REFUTED" | "UNCERTAIN",
    "confidence": 0.0-1.0,
    "explanation": "brief explanation citing specific evidence",
    "key_facts": ["fact1", "fact2"]
}}

Guidelines:
- SUPPORTED: Evidence clearly confirms the claim
- REFUTED: Evidence clearly refutes the claim
- UNCERTAIN: Insufficient or conflicting evidence
- Be conservative: prefer UNCERTAIN over hasty conclusions
- Cite specific snippets from evidence in explanation"#
    )
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct ClaimSelection {
    #[serde(default)]
    selected_claims: Vec<SelectedClaim>,
}

#[derive(Debug, Deserialize)]
struct SelectedClaim {
    claim: String,
    #[serde(default)]
    #[allow(dead_code)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct VerificationPayload {
    verdict: String,
    confidence: f64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    key_facts: Vec<String>,
}

/// Drop evidence whose URL host matches the blocklist.
fn filter_evidence(hits: Vec<SearchHit>, blocklist: &HostBlocklist) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| {
            if blocklist.is_blocked(&hit.url) {
                warn!(url = %hit.url, "blocked evidence URL");
                false
            } else {
                true
            }
        })
        .collect()
}

/// Numbered snippet block handed to the verification prompt.
fn format_evidence(hits: &[SearchHit]) -> String {
    let mut formatted = String::new();
    for (i, hit) in hits.iter().enumerate() {
        formatted.push_str(&format!(
            "\n[Source {}] {}\n{}\nURL: {}\n",
            i + 1,
            hit.title,
            hit.snippet,
            hit.url
        ));
    }
    formatted
}

/// Parameters for the fact engine, derived from the engine configuration.
#[derive(Debug, Clone)]
pub struct FactSettings {
    pub max_claims_per_batch: usize,
    pub search_options: SearchOptions,
    pub blocklist: HostBlocklist,
    pub selection: LlmCallSettings,
    pub query: LlmCallSettings,
    pub verification: LlmCallSettings,
}

impl FactSettings {
    pub fn from_config(
        max_claims_per_batch: usize,
        search: &SearchSettings,
        llm: &LlmSettings,
    ) -> Self {
        Self {
            max_claims_per_batch,
            search_options: SearchOptions {
                max_results: search.max_results,
                safesearch: search.safesearch,
                region: search.region.clone(),
            },
            blocklist: search.url_blocklist.clone(),
            selection: llm.selection.clone(),
            query: llm.query.clone(),
            verification: llm.verification.clone(),
        }
    }
}

/// Selects claims from sentence batches and verifies queued claims.
pub struct FactEngine {
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn TextSearch>,
    state: Arc<StateCore>,
    sink: Arc<dyn EventSink>,
    settings: FactSettings,
}

impl FactEngine {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn TextSearch>,
        state: Arc<StateCore>,
        sink: Arc<dyn EventSink>,
        settings: FactSettings,
    ) -> Self {
        Self {
            llm,
            search,
            state,
            sink,
            settings,
        }
    }

    // =========================================================================
    // Claim selection
    // =========================================================================

    /// Run claim selection over one drained batch and enqueue the picks.
    ///
    /// Failures are logged and emitted; the batch is simply lost (the stream
    /// has moved on). An empty selection is a valid, quiet outcome.
    pub async fn run_selection(self: Arc<Self>, sentences: Vec<String>) {
        if let Err(err) = self.select_claims(sentences).await {
            warn!(error = %err, "claim selection failed");
            self.sink.emit(Notification::from_error(&err)).await;
        }
    }

    async fn select_claims(&self, sentences: Vec<String>) -> EngineResult<()> {
        if sentences.is_empty() {
            return Ok(());
        }
        let paragraph = sentences.join(" ");
        let request = CompletionRequest::new(
            SELECTION_SYSTEM_PROMPT,
            selection_prompt(&paragraph, self.settings.max_claims_per_batch),
        )
        .with_model(self.settings.selection.model.clone())
        .with_temperature(self.settings.selection.temperature)
        .with_max_tokens(self.settings.selection.max_tokens);

        let raw = self.llm.complete(request).await.map_err(EngineError::from)?;
        let selection: ClaimSelection = parse_json_response(&raw)?;

        let picks = selection
            .selected_claims
            .into_iter()
            .map(|c| c.claim)
            .filter(|c| !c.trim().is_empty())
            .take(self.settings.max_claims_per_batch);

        for claim in picks {
            let queue_size = self.state.enqueue_claim(claim.clone());
            info!(queue_size, claim = %claim, "claim selected");
            self.sink
                .emit(Notification::ClaimSelected { claim, queue_size })
                .await;
        }
        Ok(())
    }

    // =========================================================================
    // Verification pipeline
    // =========================================================================

    /// Run the full optimize -> search -> verify pipeline for one claim.
    ///
    /// On success a FactResult is stored and announced. Any step error
    /// terminates the claim with no result.
    pub async fn verify_claim(&self, claim: &str) -> EngineResult<()> {
        let query = self.optimize_query(claim).await?;

        let hits = self
            .search
            .search(&query, &self.settings.search_options)
            .await
            .map_err(EngineError::from)?;
        let evidence = filter_evidence(hits, &self.settings.blocklist);
        info!(claim = %claim, query = %query, sources = evidence.len(), "evidence retrieved");

        let result = if evidence.is_empty() {
            // Nothing to judge against: report the claim as unverifiable
            // rather than dropping it silently.
            FactResult {
                claim: claim.to_string(),
                verdict: Verdict::Uncertain,
                confidence: 0.0,
                explanation: "No evidence found to verify this claim".to_string(),
                key_facts: Vec::new(),
                evidence_sources: Vec::new(),
                search_query: query,
                timestamp_ms: epoch_millis(),
            }
        } else {
            self.judge(claim, &query, &evidence).await?
        };

        let stored = self.state.append_fact_result(result);
        info!(verdict = %stored.verdict, confidence = stored.confidence, "fact check complete");
        self.sink.emit(Notification::from_fact_result(&stored)).await;
        Ok(())
    }

    /// Reduce the claim to a concise search query.
    async fn optimize_query(&self, claim: &str) -> EngineResult<String> {
        let request = CompletionRequest::new(QUERY_SYSTEM_PROMPT, query_prompt(claim))
            .with_model(self.settings.query.model.clone())
            .with_temperature(self.settings.query.temperature)
            .with_max_tokens(self.settings.query.max_tokens);

        let raw = self.llm.complete(request).await.map_err(EngineError::from)?;
        let query = raw.trim().trim_matches(['"', '\'']).trim().to_string();
        if query.is_empty() {
            return Err(EngineError::Parse(
                "query optimization returned empty text".to_string(),
            ));
        }
        Ok(query)
    }

    /// Judge the claim against retrieved evidence.
    async fn judge(
        &self,
        claim: &str,
        query: &str,
        evidence: &[SearchHit],
    ) -> EngineResult<FactResult> {
        let request = CompletionRequest::new(
            VERIFICATION_SYSTEM_PROMPT,
            verification_prompt(claim, &format_evidence(evidence)),
        )
        .with_model(self.settings.verification.model.clone())
        .with_temperature(self.settings.verification.temperature)
        .with_max_tokens(self.settings.verification.max_tokens);

        let raw = self.llm.complete(request).await.map_err(EngineError::from)?;
        let payload: VerificationPayload = parse_json_response(&raw)?;

        let verdict: Verdict = payload
            .verdict
            .parse()
            .map_err(EngineError::Policy)?;
        if !(0.0..=1.0).contains(&payload.confidence) {
            return Err(EngineError::Policy(format!(
                "confidence {} is outside [0, 1]",
                payload.confidence
            )));
        }

        Ok(FactResult {
            claim: claim.to_string(),
            verdict,
            confidence: payload.confidence,
            explanation: payload.explanation,
            key_facts: payload.key_facts,
            evidence_sources: evidence.iter().map(|hit| hit.url.clone()).collect(),
            search_query: query.to_string(),
            timestamp_ms: epoch_millis(),
        })
    }

    pub(crate) fn state(&self) -> &Arc<StateCore> {
        &self.state
    }

    pub(crate) fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }
}
