use crate::html_scan::{Tag, decode_entities, tags, visible_text};
use crate::keywords;
use crate::models::SeoAnalysis;
use crate::seo_analyzer::SeoAnalyzer;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MAX_KEYWORDS: usize = 20;

const OPEN_GRAPH_PROPERTIES: [&str; 6] = [
    "og:title",
    "og:description",
    "og:image",
    "og:type",
    "og:url",
    "og:site_name",
];

const TWITTER_PROPERTIES: [&str; 4] = [
    "twitter:card",
    "twitter:title",
    "twitter:description",
    "twitter:image",
];

const JSON_LD_MIME: &str = "application/ld+json";

/// Head metadata and structural counts collected in a single pass over the tags.
#[derive(Debug, Default)]
struct DocumentSignals {
    title: Option<String>,
    meta_description: Option<String>,
    canonical: Option<String>,
    has_robots_meta: bool,
    robots: Option<String>,
    open_graph: BTreeMap<String, String>,
    twitter: BTreeMap<String, String>,
    json_ld_types: BTreeSet<String>,
    h1_count: usize,
    image_count: usize,
    image_alt_with_text: usize,
}

impl DocumentSignals {
    fn collect(html: &str) -> Self {
        let mut signals = Self::default();
        for tag in tags(html) {
            signals.visit(&tag);
        }
        signals
    }

    fn visit(&mut self, tag: &Tag<'_>) {
        if tag.opens("title") {
            if self.title.is_none() {
                self.title = tag.content.and_then(non_empty);
            }
        } else if tag.opens("meta") {
            self.visit_meta(tag);
        } else if tag.opens("link") {
            let is_canonical = tag.attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            });
            if is_canonical && self.canonical.is_none() {
                self.canonical = tag.attr("href").and_then(non_empty);
            }
        } else if tag.opens("script") {
            let is_json_ld = tag
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_MIME));
            if is_json_ld && let Some(content) = tag.content {
                collect_json_ld_block(content, &mut self.json_ld_types);
            }
        } else if tag.opens("h1") {
            self.h1_count += 1;
        } else if tag.opens("img") {
            self.image_count += 1;
            if tag.quoted_attr("alt").is_some_and(|alt| !alt.is_empty()) {
                self.image_alt_with_text += 1;
            }
        }
    }

    fn visit_meta(&mut self, tag: &Tag<'_>) {
        let content = tag.attr("content").and_then(non_empty);

        for key in [tag.attr("name"), tag.attr("property")].into_iter().flatten() {
            let key = key.trim().to_ascii_lowercase();
            match key.as_str() {
                "description" => {
                    if self.meta_description.is_none() {
                        self.meta_description = content.clone();
                    }
                }
                "robots" => {
                    if !self.has_robots_meta {
                        self.has_robots_meta = true;
                        self.robots = content.clone();
                    }
                }
                k if OPEN_GRAPH_PROPERTIES.contains(&k) => {
                    if let Some(value) = &content {
                        self.open_graph.entry(k.to_string()).or_insert_with(|| value.clone());
                    }
                }
                k if TWITTER_PROPERTIES.contains(&k) => {
                    if let Some(value) = &content {
                        self.twitter.entry(k.to_string()).or_insert_with(|| value.clone());
                    }
                }
                _ => {}
            }
        }
    }
}

/// Decodes and trims a raw value, treating blank values as absent.
fn non_empty(raw: &str) -> Option<String> {
    let decoded = decode_entities(raw);
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses one JSON-LD block and adds every `@type` found anywhere inside it.
/// Blocks that are not valid JSON are skipped.
fn collect_json_ld_block(content: &str, types: &mut BTreeSet<String>) {
    match serde_json::from_str::<Value>(content.trim()) {
        Ok(value) => collect_json_ld_types(&value, types),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping malformed JSON-LD block");
        }
    }
}

fn collect_json_ld_types(value: &Value, types: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => insert_type(t, types),
                Some(Value::Array(items)) => {
                    for item in items {
                        if let Value::String(t) = item {
                            insert_type(t, types);
                        }
                    }
                }
                _ => {}
            }
            for child in map.values() {
                collect_json_ld_types(child, types);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_json_ld_types(item, types);
            }
        }
        _ => {}
    }
}

fn insert_type(t: &str, types: &mut BTreeSet<String>) {
    let t = t.trim();
    if !t.is_empty() {
        types.insert(t.to_string());
    }
}

/// Turns raw HTML into an [`SeoAnalysis`]. Pure and infallible: anything that cannot be
/// found or parsed is reported as absent.
#[derive(Debug, Clone, Copy)]
pub struct SignalExtractor {
    max_keywords: usize,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalExtractor {
    pub fn new() -> Self {
        Self::with_max_keywords(DEFAULT_MAX_KEYWORDS)
    }

    pub fn with_max_keywords(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    pub fn max_keywords(&self) -> usize {
        self.max_keywords
    }

    pub fn extract(&self, url: &str, html: &str) -> SeoAnalysis {
        let signals = DocumentSignals::collect(html);
        let text = visible_text(html);
        let ranking = keywords::rank(&text, self.max_keywords);

        let mut analysis = SeoAnalysis {
            url: url.to_string(),
            title_length: char_len(&signals.title),
            title: signals.title,
            description_length: char_len(&signals.meta_description),
            meta_description: signals.meta_description,
            canonical: signals.canonical,
            has_robots_meta: signals.has_robots_meta,
            robots: signals.robots,
            open_graph: signals.open_graph,
            twitter: signals.twitter,
            json_ld_types: signals.json_ld_types,
            h1_count: signals.h1_count,
            word_count: text.split_whitespace().count(),
            image_count: signals.image_count,
            image_alt_with_text: signals.image_alt_with_text,
            keywords: ranking.keywords,
            key_phrases: ranking.phrases,
            recommendations: Vec::new(),
            score: 0,
        };

        SeoAnalyzer::analyze(&mut analysis);
        analysis
    }
}

fn char_len(value: &Option<String>) -> usize {
    value.as_ref().map_or(0, |v| v.chars().count())
}
