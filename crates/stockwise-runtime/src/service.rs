//! Insight service: retrieval followed by summarization.
//!
//! Holds the only long-lived state: the read-only retriever and the
//! summarizer. Retrieval runs on tokio's blocking pool behind a semaphore so
//! a slow embedding model never stalls the async workers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::types::{Insight, ServiceStatus};
use stockwise_catalog::{analyze_stock, ProductRecord, StockReport};
use stockwise_chat::{Summarizer, SummaryRequest};
use stockwise_core::{Error, Result, StockwiseConfig};
use stockwise_infer::EmbedderBackend;
use stockwise_retrieval::{format_context, RankedResult, Retriever};

/// Tunables taken from `StockwiseConfig`.
#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub embed_timeout: Duration,
    pub summary_timeout: Duration,
    pub max_concurrency: usize,
    pub low_stock_threshold: i64,
}

impl From<&StockwiseConfig> for InsightSettings {
    fn from(config: &StockwiseConfig) -> Self {
        Self {
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
            embed_timeout: config.embed_timeout,
            summary_timeout: config.summary_timeout,
            max_concurrency: config.max_concurrency,
            low_stock_threshold: config.low_stock_threshold,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            max_top_k: 12,
            embed_timeout: Duration::from_secs(30),
            summary_timeout: Duration::from_secs(60),
            max_concurrency: 4,
            low_stock_threshold: 10,
        }
    }
}

pub struct InsightService {
    retriever: Arc<Retriever>,
    summarizer: Arc<dyn Summarizer>,
    settings: InsightSettings,
    permits: Arc<Semaphore>,
}

impl InsightService {
    pub fn new(
        retriever: Arc<Retriever>,
        summarizer: Arc<dyn Summarizer>,
        settings: InsightSettings,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));
        Self {
            retriever,
            summarizer,
            settings,
            permits,
        }
    }

    /// Load the catalog and build the index. Any failure aborts startup.
    pub fn bootstrap(
        config: &StockwiseConfig,
        embedder: Arc<dyn EmbedderBackend>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self> {
        let records = stockwise_catalog::load(&config.data_paths.catalog)?;
        let retriever = Retriever::build(records, embedder)?;
        info!(
            "Insight service ready: {} products, top_k={}",
            retriever.len(),
            config.default_top_k
        );
        Ok(Self::new(Arc::new(retriever), summarizer, config.into()))
    }

    /// The one operation every front-end exposes.
    pub async fn generate_insight(&self, query: &str, top_k: Option<usize>) -> Result<Insight> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Query is required".into()));
        }

        let results = self.retrieve(query, top_k).await?;
        let request = SummaryRequest {
            query: query.to_string(),
            context: format_context(&results),
        };

        let insight = with_deadline(
            "summarization",
            self.settings.summary_timeout,
            self.summarizer.summarize(&request),
        )
        .await
        .map_err(|e| {
            warn!("Insight generation failed: {}", e);
            e
        })?;

        Ok(Insight { insight })
    }

    /// Rank the catalog for `query` on the blocking pool.
    pub async fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<RankedResult>> {
        let k = self.resolve_top_k(top_k);
        let retriever = Arc::clone(&self.retriever);
        let permits = Arc::clone(&self.permits);
        let query = query.to_string();

        let work = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| Error::Internal("retrieval pool closed".into()))?;
            debug!("Retrieving top {} for query ({} chars)", k, query.len());
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                retriever.retrieve(&query, k)
            })
            .await
            .map_err(|e| Error::Internal(format!("retrieval task failed: {}", e)))?
        };

        with_deadline("embedding", self.settings.embed_timeout, work).await
    }

    /// Flag products below `threshold` (default from settings).
    pub fn stock_report(&self, threshold: Option<i64>) -> StockReport {
        analyze_stock(
            self.retriever.records(),
            threshold.unwrap_or(self.settings.low_stock_threshold),
        )
    }

    pub fn products(&self) -> &[ProductRecord] {
        self.retriever.records()
    }

    pub fn status(&self) -> ServiceStatus {
        let embedder = self.retriever.embedder();
        ServiceStatus {
            products: self.retriever.len(),
            embedder: embedder.name().to_string(),
            embedding_dimension: embedder.dimension(),
            default_top_k: self.settings.default_top_k,
            llm: self.summarizer.status(),
        }
    }

    fn resolve_top_k(&self, top_k: Option<usize>) -> usize {
        top_k
            .unwrap_or(self.settings.default_top_k)
            .clamp(1, self.settings.max_top_k.max(1))
    }
}

async fn with_deadline<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { operation, after }),
    }
}
