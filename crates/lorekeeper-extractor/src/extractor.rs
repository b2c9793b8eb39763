//! Chunk orchestration: validate, split, call the AI per chunk, merge

use crate::chunking::{Chunk, TextChunker};
use crate::config::PipelineConfig;
use crate::dedup::Deduplicator;
use crate::error::ExtractorError;
use crate::fallback::ManualExtractor;
use crate::governor::{PipelineStatus, RateGovernor, Suspension};
use crate::parser::parse_llm_response;
use crate::prompt::{PromptBuilder, PromptConfig};
use crate::retry::RetryExecutor;
use crate::tokens::estimate_tokens;
use crate::types::{
    ChunkFailure, ChunkReport, ExtractionMetadata, ExtractionMode, ExtractionOutcome,
};
use crate::validation::validate_content;
use lorekeeper_domain::record::unix_now;
use lorekeeper_domain::{CompletionProvider, KnowledgeRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Model name reported for heuristic runs
const MANUAL_MODEL_NAME: &str = "manual";

/// Turns documents into ranked, deduplicated knowledge records
pub struct KnowledgeExtractor<P>
where
    P: CompletionProvider,
{
    provider: Arc<P>,
    governor: Arc<RateGovernor>,
    executor: RetryExecutor,
    config: PipelineConfig,
    chunker: TextChunker,
    deduplicator: Deduplicator,
    manual: ManualExtractor,
}

impl<P> KnowledgeExtractor<P>
where
    P: CompletionProvider,
{
    /// Create an extractor with its own governor
    pub fn new(provider: P, config: PipelineConfig) -> Result<Self, ExtractorError> {
        let governor = Arc::new(RateGovernor::new(&config));
        Self::with_governor(provider, config, governor)
    }

    /// Create an extractor that shares `governor` with other extractors
    ///
    /// Extractors in one process must share a governor for the throttle
    /// interval to hold across documents.
    pub fn with_governor(
        provider: P,
        config: PipelineConfig,
        governor: Arc<RateGovernor>,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            provider: Arc::new(provider),
            executor: RetryExecutor::from_config(Arc::clone(&governor), &config),
            governor,
            chunker: TextChunker::new(config.max_tokens_per_chunk),
            deduplicator: Deduplicator::new(config.similarity_threshold),
            manual: ManualExtractor::new(config.max_content_display_chars),
            config,
        })
    }

    /// The shared governor
    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Availability status
    pub async fn status(&self) -> PipelineStatus {
        self.governor.status().await
    }

    /// Extract records from a document through the AI endpoint
    ///
    /// Chunk failures are reported in the outcome instead of failing the
    /// document. An open breaker stops further calls; it is an error only
    /// when no chunk had succeeded yet.
    pub async fn process_document(
        &self,
        text: &str,
        label: &str,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        self.run_ai(text, label).await.map(|(outcome, _)| outcome)
    }

    /// Extract records without calling the AI endpoint
    pub fn extract_manual(
        &self,
        text: &str,
        label: &str,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        let start_time = Instant::now();
        validate_content(text, self.config.min_content_chars)?;

        let records = self.manual.extract_heuristically(text, label);
        let records_before_dedup = records.len();
        let records = self.rank(records);

        info!(
            "Manual extraction for '{}': {} records ({} before dedup)",
            label,
            records.len(),
            records_before_dedup
        );

        Ok(ExtractionOutcome {
            metadata: ExtractionMetadata {
                source_label: label.to_string(),
                timestamp: unix_now(),
                model_name: MANUAL_MODEL_NAME.to_string(),
                total_tokens: estimate_tokens(text),
                chunk_count: 0,
                records_before_dedup,
                records_after_dedup: records.len(),
                processing_time_ms: elapsed_ms(start_time),
            },
            records,
            chunks: Vec::new(),
            interrupted: None,
        })
    }

    /// Extract records using the path selected by `mode`
    ///
    /// With `AiWithFallback`, heuristic extraction covers what the AI path
    /// could not: the whole document when the breaker is open before any
    /// chunk succeeds, otherwise every chunk that was skipped or whose call
    /// failed, merged with the AI records.
    pub async fn extract_with_fallback(
        &self,
        text: &str,
        label: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        match mode {
            ExtractionMode::Manual => self.extract_manual(text, label),
            ExtractionMode::Ai => self.process_document(text, label).await,
            ExtractionMode::AiWithFallback => match self.run_ai(text, label).await {
                Ok((outcome, chunks)) => Ok(self.fill_unavailable_chunks(outcome, &chunks, label)),
                Err(e) if e.is_circuit_open() => {
                    warn!("AI path unavailable ({}); using manual extraction for '{}'", e, label);
                    let mut outcome = self.extract_manual(text, label)?;
                    outcome.interrupted = suspension_of(&e);
                    Ok(outcome)
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn run_ai(
        &self,
        text: &str,
        label: &str,
    ) -> Result<(ExtractionOutcome, Vec<Chunk>), ExtractorError> {
        let start_time = Instant::now();
        validate_content(text, self.config.min_content_chars)?;

        let total_tokens = estimate_tokens(text);
        info!(
            "Starting extraction for '{}': ~{} tokens, {} chars",
            label,
            total_tokens,
            text.len()
        );

        let chunks = if total_tokens <= self.config.single_chunk_token_limit {
            vec![Chunk {
                index: 1,
                total: 1,
                text: text.to_string(),
            }]
        } else {
            let chunks = self.chunker.chunk_document(text);
            info!("Document exceeds single-prompt limit, split into {} chunks", chunks.len());
            chunks
        };

        let base_prompt = PromptConfig::whole_document(
            label,
            self.config.max_output_tokens,
            self.config.temperature,
        );

        let mut records = Vec::new();
        let mut reports = Vec::with_capacity(chunks.len());
        let mut interrupted: Option<Suspension> = None;

        for chunk in &chunks {
            if interrupted.is_some() {
                reports.push(report(chunk, Err(ChunkFailure::Skipped)));
                continue;
            }

            debug!("Processing chunk {}/{}", chunk.index, chunk.total);
            let (prompt_config, source) = if chunk.total == 1 {
                (base_prompt.clone(), label.to_string())
            } else {
                (
                    base_prompt.for_chunk(chunk.index, chunk.total),
                    chunk_source(label, chunk),
                )
            };

            match self.extract_chunk(&chunk.text, &prompt_config, &source).await {
                Ok(chunk_records) => {
                    info!(
                        "Chunk {}/{}: {} records",
                        chunk.index,
                        chunk.total,
                        chunk_records.len()
                    );
                    reports.push(report(chunk, Ok(chunk_records.len())));
                    records.extend(chunk_records);
                }
                Err(e) if e.is_circuit_open() => {
                    if !reports.iter().any(|r: &ChunkReport| r.outcome.is_ok()) {
                        warn!("Circuit open before any chunk of '{}' succeeded", label);
                        return Err(e);
                    }
                    warn!(
                        "Circuit opened at chunk {}/{}; returning partial results",
                        chunk.index, chunk.total
                    );
                    reports.push(report(chunk, Err(ChunkFailure::Skipped)));
                    interrupted = suspension_of(&e);
                }
                Err(ExtractorError::Parse(parse_error)) => {
                    warn!(
                        "Skipping chunk {}/{}: {}",
                        chunk.index, chunk.total, parse_error
                    );
                    reports.push(report(chunk, Err(ChunkFailure::Parse(parse_error))));
                }
                Err(e) => {
                    warn!("Skipping chunk {}/{}: {}", chunk.index, chunk.total, e);
                    reports.push(report(chunk, Err(ChunkFailure::Retry(e.to_string()))));
                }
            }
        }

        let records_before_dedup = records.len();
        let records = self.rank(records);

        let metadata = ExtractionMetadata {
            source_label: label.to_string(),
            timestamp: unix_now(),
            model_name: self.provider.model_name().to_string(),
            total_tokens,
            chunk_count: chunks.len(),
            records_before_dedup,
            records_after_dedup: records.len(),
            processing_time_ms: elapsed_ms(start_time),
        };

        let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
        info!(
            "Extraction complete for '{}': {} records from {} chunks ({} failed)",
            label,
            records.len(),
            chunks.len(),
            failed
        );

        let outcome = ExtractionOutcome {
            records,
            chunks: reports,
            interrupted,
            metadata,
        };
        Ok((outcome, chunks))
    }

    /// One prompt, one retried call, one parse
    async fn extract_chunk(
        &self,
        text: &str,
        prompt_config: &PromptConfig,
        source: &str,
    ) -> Result<Vec<KnowledgeRecord>, ExtractorError> {
        let request = PromptBuilder::new(prompt_config, text).request();
        debug!("Prompt length: {} chars", request.prompt.len());

        let response = self
            .executor
            .execute(|| self.provider.complete(&request))
            .await?;
        debug!("AI response length: {} chars", response.len());

        Ok(parse_llm_response(&response, source)?)
    }

    /// Heuristic records for chunks the endpoint never answered
    fn fill_unavailable_chunks(
        &self,
        mut outcome: ExtractionOutcome,
        chunks: &[Chunk],
        label: &str,
    ) -> ExtractionOutcome {
        let unavailable: Vec<&Chunk> = chunks
            .iter()
            .zip(&outcome.chunks)
            .filter(|(_, chunk_report)| {
                matches!(
                    chunk_report.outcome,
                    Err(ChunkFailure::Skipped) | Err(ChunkFailure::Retry(_))
                )
            })
            .map(|(chunk, _)| chunk)
            .collect();
        if unavailable.is_empty() {
            return outcome;
        }

        let mut merged = outcome.records;
        for chunk in &unavailable {
            let source = if chunk.total == 1 {
                label.to_string()
            } else {
                chunk_source(label, chunk)
            };
            merged.extend(self.manual.extract_heuristically(&chunk.text, &source));
        }

        info!(
            "Filled {} unavailable chunk(s) of '{}' manually ({} records before merge)",
            unavailable.len(),
            label,
            merged.len()
        );
        outcome.metadata.records_before_dedup = merged.len();
        outcome.records = self.rank(merged);
        outcome.metadata.records_after_dedup = outcome.records.len();
        outcome
    }

    /// Rank and deduplicate once the record count passes the trigger
    fn rank(&self, records: Vec<KnowledgeRecord>) -> Vec<KnowledgeRecord> {
        let trigger = self.config.dedup_trigger.min(self.config.max_records);
        if records.len() <= trigger {
            return records;
        }
        info!("{} records exceed trigger {}, deduplicating", records.len(), trigger);
        self.deduplicator.optimize(records, self.config.max_records)
    }
}

fn report(chunk: &Chunk, outcome: Result<usize, ChunkFailure>) -> ChunkReport {
    ChunkReport {
        index: chunk.index,
        total: chunk.total,
        outcome,
    }
}

fn chunk_source(label: &str, chunk: &Chunk) -> String {
    format!("{}#chunk-{}/{}", label, chunk.index, chunk.total)
}

fn suspension_of(error: &ExtractorError) -> Option<Suspension> {
    match error {
        ExtractorError::CircuitOpen {
            until,
            remaining_secs,
            consecutive_failures,
        } => Some(Suspension {
            until: *until,
            remaining: Duration::from_secs(*remaining_secs),
            consecutive_failures: *consecutive_failures,
        }),
        _ => None,
    }
}

fn elapsed_ms(start_time: Instant) -> u64 {
    u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX)
}
