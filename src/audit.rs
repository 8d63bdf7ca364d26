use crate::extractor::SignalExtractor;
use crate::fetcher::{FetchError, PageFetcher};
use crate::models::{AuditFailure, AuditSummary, SeoAnalysis, SiteAudit};
use futures::stream::{self, StreamExt};
use governor::{DefaultDirectRateLimiter, Quota};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroU32;

/// Configuration for a site audit
pub struct AuditConfig {
    pub concurrency: usize,
    pub requests_per_second: Option<f64>,
}

/// Analyzes a set of same-origin pages and summarizes the results.
pub struct SiteAuditor {
    fetcher: PageFetcher,
    extractor: SignalExtractor,
    concurrency: usize,
    throttle: Option<DefaultDirectRateLimiter>,
    progress_bar: Option<ProgressBar>,
}

impl SiteAuditor {
    pub fn new(fetcher: PageFetcher, extractor: SignalExtractor, config: AuditConfig) -> Self {
        // Only throttle when a positive rate was requested
        let throttle = config
            .requests_per_second
            .filter(|rps| rps.is_finite() && *rps > 0.0)
            .and_then(|rps| NonZeroU32::new(rps.ceil() as u32))
            .map(|rps| governor::RateLimiter::direct(Quota::per_second(rps)));

        Self {
            fetcher,
            extractor,
            concurrency: config.concurrency.max(1),
            throttle,
            progress_bar: None,
        }
    }

    /// Enable progress bar for the audit
    pub fn enable_progress_bar(&mut self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} pages")
                .expect("Progress bar template should be valid"),
        );
        self.progress_bar = Some(pb);
    }

    pub async fn run(&self, targets: &[String]) -> SiteAudit {
        let mut seen = HashSet::new();
        let targets: Vec<&String> = targets.iter().filter(|t| seen.insert(*t)).collect();

        let results = stream::iter(&targets)
            .map(|target| async move {
                let result = self.audit_page(target).await;
                if let Some(ref pb) = self.progress_bar {
                    pb.inc(1);
                }
                result
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }

        let mut pages = Vec::new();
        let mut failures = Vec::new();
        for (target, result) in targets.into_iter().zip(results) {
            match result {
                Ok(analysis) => pages.push(analysis),
                Err(e) => {
                    tracing::error!(target = %target, error = %e, "Failed to audit page");
                    failures.push(AuditFailure {
                        target: target.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = summarize(&pages, failures.len());

        SiteAudit {
            origin: self.fetcher.origin().to_string(),
            pages,
            failures,
            summary,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn audit_page(&self, target: &str) -> Result<SeoAnalysis, FetchError> {
        // Reject off-site targets before they cost a throttle slot
        self.fetcher.resolve(target)?;

        if let Some(throttle) = &self.throttle {
            throttle.until_ready().await;
        }

        let page = self.fetcher.fetch(target).await?;
        Ok(self.extractor.extract(page.url.as_str(), &page.html))
    }
}

pub fn summarize(pages: &[SeoAnalysis], failed: usize) -> AuditSummary {
    let mut recommendation_counts = BTreeMap::new();
    for page in pages {
        for recommendation in &page.recommendations {
            *recommendation_counts
                .entry(recommendation.clone())
                .or_insert(0) += 1;
        }
    }

    let average_score = if pages.is_empty() {
        0.0
    } else {
        let total: f64 = pages.iter().map(|p| f64::from(p.score)).sum();
        (total / pages.len() as f64 * 10.0).round() / 10.0
    };

    // First page wins ties so the summary is stable across runs
    let lowest = pages
        .iter()
        .reduce(|lowest, page| if page.score < lowest.score { page } else { lowest });

    AuditSummary {
        pages_analyzed: pages.len(),
        failed,
        average_score,
        lowest_score: lowest.map(|p| p.score),
        lowest_score_url: lowest.map(|p| p.url.clone()),
        recommendation_counts,
    }
}
