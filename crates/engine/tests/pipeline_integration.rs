//! End-to-end pipeline tests against scripted reasoning engines and evidence
//! providers. The live test is `#[ignore]`; run it with
//! `cargo test -- --ignored` and ANTHROPIC_API_KEY set.
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusBuilder;

use veracity_common::api::analyze::{ErrorResponse, HealthResponse};
use veracity_common::config::{ProviderCredentials, SystemConfig};
use veracity_common::types::{
    AnalysisResult, AuthorshipMethod, EvidenceItem, ProviderId, VerdictLabel,
};
use veracity_engine::llm::{ChatFuture, ChatMessage, LlmClient, LlmError, ReasoningEngine};
use veracity_engine::prompts::Prompts;
use veracity_engine::routes::{self, AppState};
use veracity_engine::{Pipeline, PipelineError};
use veracity_evidence::{
    EvidenceCascade, EvidenceProvider, ProviderFailure, ProviderOutcome, SearchFuture,
};

const ARTICLE: &str = "The Eiffel Tower was completed in 1889 for the World's Fair in Paris. \
    It stands 330 metres tall and was the tallest structure in the world until 1930.";

const CLAIMS_REPLY: &str = r#"{"claims": [
    "The Eiffel Tower was completed in 1889.",
    "The Eiffel Tower stands 330 metres tall."
]}"#;

fn system_config() -> SystemConfig {
    toml::from_str(
        r#"
        [llm]
        provider = "anthropic"
        model = "test-model"

        [llm.max_output_tokens]
        claims = 500
        verification = 2000
        authorship = 600

        [retry]
        max_attempts = 1
        initial_backoff_ms = 1
        max_backoff_ms = 1
        backoff_multiplier = 1.0
        jitter = false
        "#,
    )
    .expect("test config parses")
}

/// Which pipeline stage a request belongs to, judged by its system prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Claims,
    Verification,
    Authorship,
}

fn stage_of(messages: &[ChatMessage]) -> Stage {
    let prompts = Prompts::default();
    let system = messages
        .first()
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    if system == prompts.claims {
        Stage::Claims
    } else if system == prompts.verification {
        Stage::Verification
    } else {
        Stage::Authorship
    }
}

/// Answers each stage from its own script and records every user message.
struct StagedEngine {
    claims: Result<String, LlmError>,
    verification: Result<String, LlmError>,
    authorship: Result<String, LlmError>,
    seen: Mutex<Vec<(Stage, String)>>,
}

impl StagedEngine {
    fn new(
        claims: Result<String, LlmError>,
        verification: Result<String, LlmError>,
        authorship: Result<String, LlmError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            claims,
            verification,
            authorship,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn user_message(&self, stage: Stage) -> Option<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, m)| m.clone())
    }
}

fn replay(result: &Result<String, LlmError>) -> Result<String, LlmError> {
    match result {
        Ok(text) => Ok(text.clone()),
        Err(LlmError::Auth(m)) => Err(LlmError::Auth(m.clone())),
        Err(_) => Err(LlmError::Api("scripted failure".into())),
    }
}

impl ReasoningEngine for StagedEngine {
    fn chat<'a>(&'a self, messages: &'a [ChatMessage], _max: u32) -> ChatFuture<'a> {
        let stage = stage_of(messages);
        let user = messages
            .get(1)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.seen.lock().unwrap().push((stage, user));

        let result = match stage {
            Stage::Claims => replay(&self.claims),
            Stage::Verification => replay(&self.verification),
            Stage::Authorship => replay(&self.authorship),
        };
        Box::pin(async move { result })
    }

    fn describe(&self) -> String {
        "staged/test".into()
    }
}

/// Provider returning a fixed outcome for every query.
struct FixedProvider {
    id: ProviderId,
    available: bool,
    outcome: ProviderOutcome,
    calls: Mutex<Vec<String>>,
}

impl FixedProvider {
    fn new(id: ProviderId, available: bool, outcome: ProviderOutcome) -> Arc<Self> {
        Arc::new(Self {
            id,
            available,
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl EvidenceProvider for FixedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn search<'a>(&'a self, query: &'a str, _limit: usize) -> SearchFuture<'a> {
        self.calls.lock().unwrap().push(query.to_string());
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

fn item(provider: ProviderId, n: usize) -> EvidenceItem {
    EvidenceItem {
        title: format!("Eiffel Tower result {}", n),
        url: format!("https://example.org/eiffel/{}", n),
        snippet: "The tower was completed in March 1889 and is 330 m tall.".into(),
        source: "example.org".into(),
        provider,
    }
}

fn pipeline(
    engine: Option<Arc<StagedEngine>>,
    providers: Vec<Arc<FixedProvider>>,
) -> Pipeline {
    let config = system_config();
    let providers = providers
        .into_iter()
        .map(|p| p as Arc<dyn EvidenceProvider>)
        .collect();
    let cascade = EvidenceCascade::new(providers, &config.evidence);
    Pipeline::new(
        engine.map(|e| e as Arc<dyn ReasoningEngine>),
        cascade,
        &config,
        &Prompts::default(),
    )
}

#[tokio::test]
async fn test_supported_claims_end_to_end() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Ok(r#"```json
        {"claims": [
            {"claim": "The Eiffel Tower was completed in 1889.", "verdict": "SUPPORTED", "confidence": 92, "explanation": "Multiple sources agree."},
            {"claim": "The Eiffel Tower stands 330 metres tall.", "verdict": "supported", "confidence": "88", "explanation": "Height matches."},
        ],
        "overallAssessment": "The text is accurate."}
        ```"#
            .into()),
        Ok(r#"{"verdict": "HUMAN", "confidence": 20, "explanation": "Plain encyclopedic prose."}"#.into()),
    );
    let serper = FixedProvider::new(
        ProviderId::Serper,
        true,
        ProviderOutcome::Found((0..4).map(|n| item(ProviderId::Serper, n)).collect()),
    );
    let wikipedia = FixedProvider::new(ProviderId::Wikipedia, true, ProviderOutcome::Empty);

    let result = pipeline(Some(engine.clone()), vec![serper.clone(), wikipedia.clone()])
        .analyze(ARTICLE)
        .await
        .unwrap();

    assert_eq!(result.claims.len(), 2);
    assert_eq!(result.count(VerdictLabel::Supported), 2);
    assert_eq!(result.claims[1].confidence, 88);
    // Evidence attached to each verdict is capped.
    assert_eq!(result.claims[0].top_evidence.len(), 3);
    assert_eq!(result.overall_assessment, "The text is accurate.");
    assert_eq!(result.authorship.method, AuthorshipMethod::ReasoningEngine);
    assert!(!result.authorship.is_ai_written);

    // Serper satisfied the threshold for both claims; Wikipedia was never consulted.
    assert_eq!(serper.call_count(), 2);
    assert_eq!(wikipedia.call_count(), 0);

    let request = engine.user_message(Stage::Verification).unwrap();
    assert!(request.contains("Eiffel Tower result 0"));
    assert!(!request.contains("NO EVIDENCE FOUND"));
}

#[tokio::test]
async fn test_no_evidence_anywhere_yields_insufficient() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Ok(r#"{"claims": [
            {"claim": "The Eiffel Tower was completed in 1889.", "verdict": "INSUFFICIENT", "confidence": 30, "explanation": "No evidence."},
            {"claim": "The Eiffel Tower stands 330 metres tall.", "verdict": "UNVERIFIABLE", "confidence": 20, "explanation": "No evidence."}
        ]}"#
            .into()),
        Err(LlmError::Api("down".into())),
    );
    let serper = FixedProvider::new(ProviderId::Serper, false, ProviderOutcome::Empty);
    let brave = FixedProvider::new(
        ProviderId::Brave,
        true,
        ProviderOutcome::Failed(ProviderFailure::Status(503)),
    );
    let wikipedia = FixedProvider::new(ProviderId::Wikipedia, true, ProviderOutcome::Empty);

    let result = pipeline(
        Some(engine.clone()),
        vec![serper.clone(), brave.clone(), wikipedia.clone()],
    )
    .analyze(ARTICLE)
    .await
    .unwrap();

    assert_eq!(serper.call_count(), 0);
    assert_eq!(brave.call_count(), 2);
    assert_eq!(wikipedia.call_count(), 2);

    assert_eq!(result.count(VerdictLabel::Insufficient), 2);
    assert!(result.claims.iter().all(|v| v.top_evidence.is_empty()));
    assert!(result
        .overall_assessment
        .starts_with("Available evidence is insufficient"));
    assert_eq!(result.authorship.method, AuthorshipMethod::HeuristicFallback);

    let request = engine.user_message(Stage::Verification).unwrap();
    assert_eq!(request.matches("NO EVIDENCE FOUND").count(), 2);
}

#[tokio::test]
async fn test_claim_extraction_falls_back_to_heuristics() {
    let engine = StagedEngine::new(
        Ok("I could not find any claims.".into()),
        Ok(r#"{"claims": [{"verdict": "SUPPORTED", "confidence": 70, "explanation": "ok"}]}"#.into()),
        Ok(r#"{"confidence": 10}"#.into()),
    );

    let result = pipeline(Some(engine.clone()), Vec::new())
        .analyze(ARTICLE)
        .await
        .unwrap();

    // Heuristic claims still reach verification, and the positional verdict binds to the first.
    let request = engine.user_message(Stage::Verification).unwrap();
    assert!(request.contains("Claim 1: The Eiffel Tower was completed in 1889"));
    assert_eq!(result.claims[0].verdict, VerdictLabel::Supported);
    assert!(result.claims[0].claim.starts_with("The Eiffel Tower was completed"));
}

#[tokio::test]
async fn test_verification_failure_is_reasoning_unavailable() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Err(LlmError::Auth("invalid x-api-key".into())),
        Ok(r#"{"confidence": 10}"#.into()),
    );

    let err = pipeline(Some(engine), Vec::new())
        .analyze(ARTICLE)
        .await
        .unwrap_err();

    match err {
        PipelineError::ReasoningUnavailable { reason } => assert!(reason.contains("invalid x-api-key")),
        other => panic!("expected ReasoningUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_engine_is_reasoning_unavailable() {
    let err = pipeline(None, Vec::new()).analyze(ARTICLE).await.unwrap_err();
    assert_eq!(err.kind(), "reasoning_unavailable");
}

#[tokio::test]
async fn test_unparseable_verdicts_carry_raw_reply() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Ok("Both claims look right to me.".into()),
        Ok(r#"{"confidence": 10}"#.into()),
    );

    let err = pipeline(Some(engine), Vec::new())
        .analyze(ARTICLE)
        .await
        .unwrap_err();

    match err {
        PipelineError::VerdictUnparseable { raw } => {
            assert_eq!(raw, "Both claims look right to me.")
        }
        other => panic!("expected VerdictUnparseable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_input_rejected_without_calls() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Ok("{}".into()),
        Ok("{}".into()),
    );
    let provider = FixedProvider::new(ProviderId::Serper, true, ProviderOutcome::Empty);

    let err = pipeline(Some(engine.clone()), vec![provider.clone()])
        .analyze("   \n\t ")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::EmptyInput));
    assert!(engine.seen.lock().unwrap().is_empty());
    assert_eq!(provider.call_count(), 0);
}

async fn serve(pipeline: Pipeline) -> String {
    let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
    let app = routes::router(Arc::new(AppState {
        pipeline,
        metrics_handle,
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_analyze_and_health() {
    let engine = StagedEngine::new(
        Ok(CLAIMS_REPLY.into()),
        Ok(r#"{"claims": [{"claim": "The Eiffel Tower was completed in 1889.", "verdict": "REFUTED", "confidence": 60, "explanation": "x"}]}"#.into()),
        Ok(r#"{"verdict": "AI", "confidence": 85}"#.into()),
    );
    let wikipedia = FixedProvider::new(
        ProviderId::Wikipedia,
        true,
        ProviderOutcome::Found(vec![item(ProviderId::Wikipedia, 0)]),
    );
    let base = serve(pipeline(Some(engine), vec![wikipedia])).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/api/analyze", base))
        .json(&serde_json::json!({ "text": ARTICLE }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let result: AnalysisResult = response.json().await.unwrap();
    // Only one verdict came back; the missing claim is not invented.
    assert_eq!(result.claims.len(), 1);
    assert_eq!(result.claims[0].verdict, VerdictLabel::Refuted);
    assert!(result.authorship.is_ai_written);
    assert_eq!(result.authorship.ai_confidence, 85);

    let response = http
        .post(format!("{}/api/analyze", base))
        .json(&serde_json::json!({ "text": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.kind, "empty_input");

    let health: HealthResponse = http
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.reasoning_engine);
    assert_eq!(health.providers, vec!["wikipedia".to_string()]);
}

#[tokio::test]
async fn test_http_degraded_without_engine() {
    let base = serve(pipeline(None, Vec::new())).await;
    let http = reqwest::Client::new();

    let health: HealthResponse = http
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "degraded");
    assert!(!health.reasoning_engine);

    let response = http
        .post(format!("{}/api/analyze", base))
        .json(&serde_json::json!({ "text": ARTICLE }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.kind, "reasoning_unavailable");
    assert!(body.raw.is_none());
}

#[tokio::test]
#[ignore]
async fn test_live_analysis() {
    let mut config = system_config();
    config.llm.model = std::env::var("VERACITY_TEST_MODEL")
        .unwrap_or_else(|_| "claude-sonnet-4-20250514".into());
    let client = LlmClient::new(config.llm.clone(), config.retry.clone())
        .expect("ANTHROPIC_API_KEY must be set");
    let http = reqwest::Client::new();
    let cascade = EvidenceCascade::from_config(&http, &ProviderCredentials::from_env(), &config.evidence);
    let pipeline = Pipeline::new(
        Some(Arc::new(client) as Arc<dyn ReasoningEngine>),
        cascade,
        &config,
        &Prompts::default(),
    );

    let result = pipeline.analyze(ARTICLE).await.expect("analysis succeeds");
    assert!(!result.claims.is_empty());
    assert!(result.claims.iter().all(|v| v.confidence <= 100));
}
