use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// SEO signals, keyword rankings and recommendations for one HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub url: String,
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub description_length: usize,
    pub canonical: Option<String>,
    pub has_robots_meta: bool,
    pub robots: Option<String>,
    pub open_graph: BTreeMap<String, String>,
    pub twitter: BTreeMap<String, String>,
    pub json_ld_types: BTreeSet<String>,
    pub h1_count: usize,
    pub word_count: usize,
    pub image_count: usize,
    pub image_alt_with_text: usize,
    pub keywords: Vec<String>,
    pub key_phrases: Vec<String>,
    pub recommendations: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRanking {
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityReport {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    pub average_words_per_sentence: f64,
    pub average_syllables_per_word: f64,
    pub flesch_reading_ease: f64,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAudit {
    pub origin: String,
    pub pages: Vec<SeoAnalysis>,
    pub failures: Vec<AuditFailure>,
    pub summary: AuditSummary,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFailure {
    pub target: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub pages_analyzed: usize,
    pub failed: usize,
    pub average_score: f64,
    pub lowest_score: Option<u8>,
    pub lowest_score_url: Option<String>,
    /// How many analyzed pages received each recommendation
    pub recommendation_counts: BTreeMap<String, usize>,
}
