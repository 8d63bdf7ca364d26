use crate::models::{ReadabilityReport, SeoAnalysis, SiteAudit};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

pub struct Reporter;

impl Reporter {
    fn header(title: &str) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", title.bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();
    }

    fn footer() {
        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    fn colored_score(score: u8) -> ColoredString {
        let text = format!("{}/100", score);
        if score >= 80 {
            text.bright_green()
        } else if score >= 50 {
            text.yellow()
        } else {
            text.bright_red()
        }
    }

    fn optional(value: &Option<String>) -> ColoredString {
        match value {
            Some(v) => v.bright_white(),
            None => "missing".bright_red(),
        }
    }

    fn print_page_details(analysis: &SeoAnalysis) {
        println!("  {} {}", "URL:".bright_white().bold(), analysis.url);
        println!("    Score:       {}", Self::colored_score(analysis.score));
        println!(
            "    Title:       {} ({} chars)",
            Self::optional(&analysis.title),
            analysis.title_length
        );
        println!(
            "    Description: {} ({} chars)",
            Self::optional(&analysis.meta_description),
            analysis.description_length
        );
        println!("    Canonical:   {}", Self::optional(&analysis.canonical));
        if analysis.has_robots_meta {
            println!(
                "    Robots:      {}",
                analysis.robots.as_deref().unwrap_or("(empty)")
            );
        }
        println!(
            "    H1 tags:     {}   Words: {}   Images: {} ({} with alt text)",
            analysis.h1_count,
            analysis.word_count,
            analysis.image_count,
            analysis.image_alt_with_text
        );

        if !analysis.open_graph.is_empty() {
            println!("    Open Graph:");
            for (property, value) in &analysis.open_graph {
                println!("      {}: {}", property.dimmed(), value);
            }
        }
        if !analysis.twitter.is_empty() {
            println!("    Twitter Card:");
            for (property, value) in &analysis.twitter {
                println!("      {}: {}", property.dimmed(), value);
            }
        }
        if !analysis.json_ld_types.is_empty() {
            let types: Vec<_> = analysis.json_ld_types.iter().map(String::as_str).collect();
            println!("    JSON-LD:     {}", types.join(", "));
        }
        if !analysis.keywords.is_empty() {
            println!("    Keywords:    {}", analysis.keywords.join(", ").bright_cyan());
        }
        if !analysis.key_phrases.is_empty() {
            println!("    Phrases:     {}", analysis.key_phrases.join(", ").bright_cyan());
        }

        if analysis.recommendations.is_empty() {
            println!("    {}", "No recommendations, page is fully optimized".bright_green());
        } else {
            println!("    Recommendations:");
            for recommendation in &analysis.recommendations {
                println!("      [{}] {}", "FIX ".yellow(), recommendation);
            }
        }
    }

    pub fn print_analysis(analysis: &SeoAnalysis) {
        Self::header("Studiolens - SEO Analysis");
        Self::print_page_details(analysis);
        Self::footer();
    }

    pub fn print_readability(url: &str, report: &ReadabilityReport) {
        Self::header("Studiolens - Readability");
        println!("  {} {}", "URL:".bright_white().bold(), url);
        println!(
            "    Flesch reading ease: {} ({})",
            format!("{:.1}", report.flesch_reading_ease).bright_green(),
            report.level
        );
        println!(
            "    Sentences: {}   Words: {}   Syllables: {}",
            report.sentences, report.words, report.syllables
        );
        println!(
            "    Words per sentence: {:.2}   Syllables per word: {:.2}",
            report.average_words_per_sentence, report.average_syllables_per_word
        );
        Self::footer();
    }

    pub fn print_audit(audit: &SiteAudit) {
        Self::header("Studiolens - Site Audit");

        println!("{}: {}", "Origin".bright_white().bold(), audit.origin);
        println!("{}: {}", "Timestamp".bright_white().bold(), audit.timestamp);
        println!();

        let summary = &audit.summary;
        println!("{}", "Summary".bright_yellow().bold().underline());
        println!(
            "  Pages Analyzed: {}",
            summary.pages_analyzed.to_string().bright_green()
        );
        println!(
            "  Failed:         {}",
            if summary.failed > 0 {
                summary.failed.to_string().bright_red()
            } else {
                summary.failed.to_string().bright_green()
            }
        );
        println!("  Average Score:  {:.1}", summary.average_score);
        if let (Some(score), Some(url)) = (summary.lowest_score, &summary.lowest_score_url) {
            println!("  Lowest Score:   {} {}", Self::colored_score(score), url);
        }

        if !summary.recommendation_counts.is_empty() {
            println!();
            println!("{}", "Most Common Fixes".bright_yellow().bold().underline());
            let mut counts: Vec<_> = summary.recommendation_counts.iter().collect();
            counts.sort_by(|a, b| b.1.cmp(a.1));
            for (recommendation, count) in counts {
                println!("  {:>3} page(s)  {}", count, recommendation);
            }
        }

        let mut pages: Vec<_> = audit.pages.iter().collect();
        pages.sort_by_key(|page| page.score);
        if !pages.is_empty() {
            println!();
            println!("{}", "Pages".bright_yellow().bold().underline());
            for page in pages {
                println!();
                Self::print_page_details(page);
            }
        }

        if !audit.failures.is_empty() {
            println!();
            println!("{}", "Failures".bright_yellow().bold().underline());
            for failure in &audit.failures {
                println!(
                    "  [{}] {}: {}",
                    "ERROR".bright_red(),
                    failure.target,
                    failure.error
                );
            }
        }

        Self::footer();
    }

    pub fn save_json_report<T: Serialize>(report: &T, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)
            .with_context(|| format!("Failed to create report file: {}", filename))?;
        file.write_all(json.as_bytes())?;
        eprintln!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}
