use crate::models::SeoAnalysis;
use serde::{Deserialize, Serialize};

pub const TITLE_MIN_CHARS: usize = 30;
pub const TITLE_MAX_CHARS: usize = 65;
pub const DESCRIPTION_MIN_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 170;
pub const MIN_ALT_TEXT_RATIO: f64 = 0.7;
pub const MIN_WORD_COUNT: usize = 300;

const PENALTY_PER_RECOMMENDATION: usize = 7;
const MIN_SCORE: usize = 10;
const MAX_SCORE: usize = 100;

/// The signals the rule set is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageSignals<'a> {
    pub title: Option<&'a str>,
    pub meta_description: Option<&'a str>,
    pub canonical: Option<&'a str>,
    pub og_image: Option<&'a str>,
    pub json_ld_type_count: usize,
    pub h1_count: usize,
    pub image_count: usize,
    pub image_alt_with_text: usize,
    pub word_count: usize,
}

impl<'a> From<&'a SeoAnalysis> for PageSignals<'a> {
    fn from(analysis: &'a SeoAnalysis) -> Self {
        Self {
            title: analysis.title.as_deref(),
            meta_description: analysis.meta_description.as_deref(),
            canonical: analysis.canonical.as_deref(),
            og_image: analysis.open_graph.get("og:image").map(String::as_str),
            json_ld_type_count: analysis.json_ld_types.len(),
            h1_count: analysis.h1_count,
            image_count: analysis.image_count,
            image_alt_with_text: analysis.image_alt_with_text,
            word_count: analysis.word_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoRule {
    TitleLength,
    MetaDescription,
    Canonical,
    OpenGraphImage,
    StructuredData,
    SingleH1,
    ImageAltText,
    ContentLength,
}

impl SeoRule {
    /// Every rule, in evaluation order.
    pub const ALL: [SeoRule; 8] = [
        SeoRule::TitleLength,
        SeoRule::MetaDescription,
        SeoRule::Canonical,
        SeoRule::OpenGraphImage,
        SeoRule::StructuredData,
        SeoRule::SingleH1,
        SeoRule::ImageAltText,
        SeoRule::ContentLength,
    ];

    pub fn message(self) -> &'static str {
        match self {
            SeoRule::TitleLength => "Adjust the title to between 30 and 65 characters.",
            SeoRule::MetaDescription => {
                "Write a meta description between 120 and 170 characters."
            }
            SeoRule::Canonical => "Add a canonical link to the page head.",
            SeoRule::OpenGraphImage => "Add an Open Graph image (og:image) for link previews.",
            SeoRule::StructuredData => {
                "Add JSON-LD structured data (e.g. LocalBusiness or Organization)."
            }
            SeoRule::SingleH1 => "Use exactly one H1 heading on the page.",
            SeoRule::ImageAltText => "Add descriptive alt text to at least 70% of images.",
            SeoRule::ContentLength => "Increase on-page copy to at least 300 words.",
        }
    }

    pub fn fails(self, signals: &PageSignals<'_>) -> bool {
        match self {
            SeoRule::TitleLength => !length_within(
                signals.title,
                TITLE_MIN_CHARS,
                TITLE_MAX_CHARS,
            ),
            SeoRule::MetaDescription => !length_within(
                signals.meta_description,
                DESCRIPTION_MIN_CHARS,
                DESCRIPTION_MAX_CHARS,
            ),
            SeoRule::Canonical => signals.canonical.is_none(),
            SeoRule::OpenGraphImage => signals.og_image.is_none(),
            SeoRule::StructuredData => signals.json_ld_type_count == 0,
            SeoRule::SingleH1 => signals.h1_count != 1,
            // Pages without images are not judged on alt text at all
            SeoRule::ImageAltText => {
                signals.image_count > 0
                    && (signals.image_alt_with_text as f64) / (signals.image_count as f64)
                        < MIN_ALT_TEXT_RATIO
            }
            SeoRule::ContentLength => signals.word_count < MIN_WORD_COUNT,
        }
    }
}

fn length_within(value: Option<&str>, min: usize, max: usize) -> bool {
    value.is_some_and(|v| (min..=max).contains(&v.chars().count()))
}

pub struct SeoAnalyzer;

impl SeoAnalyzer {
    /// Fills in the recommendations and score of an analysis from its extracted signals.
    pub fn analyze(analysis: &mut SeoAnalysis) {
        let recommendations = Self::recommendations(&PageSignals::from(&*analysis));
        analysis.score = Self::score(recommendations.len());
        analysis.recommendations = recommendations;
    }

    /// Failing rules in evaluation order. Every rule is always evaluated.
    pub fn failed_rules(signals: &PageSignals<'_>) -> Vec<SeoRule> {
        SeoRule::ALL
            .into_iter()
            .filter(|rule| rule.fails(signals))
            .collect()
    }

    pub fn recommendations(signals: &PageSignals<'_>) -> Vec<String> {
        Self::failed_rules(signals)
            .into_iter()
            .map(|rule| rule.message().to_string())
            .collect()
    }

    /// 100 minus 7 points per recommendation, never below 10.
    pub fn score(recommendation_count: usize) -> u8 {
        let penalty = recommendation_count.saturating_mul(PENALTY_PER_RECOMMENDATION);
        let score = MAX_SCORE.saturating_sub(penalty).max(MIN_SCORE);
        score as u8
    }
}
