//! Console summaries
//!
//! Summaries are built as strings so they can be tested; the `print_*`
//! functions only write them to stdout.

use crate::collector::{CollectionReport, QueryOutcome, SurveyReport};
use std::fmt::Write;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";
const BREAKDOWN_EXAMPLES: usize = 3;
const TOP_ENTITIES: usize = 10;

/// Shortens `text` to at most `max` characters
fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn percent(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Formats a `collect` run as a per-source, per-query listing
pub fn format_collection_summary(report: &CollectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "COLLECTION SUMMARY");
    let _ = writeln!(out, "{}", RULE);

    for source in &report.sources {
        let _ = writeln!(
            out,
            "\n{} ({} / {} queries collected)",
            source.source,
            source.collected_count(),
            source.queries.len()
        );

        for query in &source.queries {
            match &query.outcome {
                QueryOutcome::Collected {
                    entity,
                    chapter_count,
                    lookups,
                    unresolved,
                    ..
                } => {
                    let found = lookups.iter().filter(|l| l.is_found()).count();
                    let _ = writeln!(
                        out,
                        "  ✓ {} -> {} ({} chapters, {}/{} requested found, {} unresolved)",
                        query.query,
                        clip(&entity.title, 50),
                        chapter_count,
                        found,
                        lookups.len(),
                        unresolved.len()
                    );
                }
                QueryOutcome::NoResults => {
                    let _ = writeln!(out, "  ✗ {} -> no search results", query.query);
                }
                QueryOutcome::NoChapters { entity } => {
                    let _ = writeln!(
                        out,
                        "  ✗ {} -> {} has no chapters",
                        query.query,
                        clip(&entity.title, 50)
                    );
                }
                QueryOutcome::Failed {
                    category, attempts, ..
                } => {
                    let _ = writeln!(
                        out,
                        "  ✗ {} -> {} after {} attempt(s)",
                        query.query, category, attempts
                    );
                }
                QueryOutcome::Cancelled => {
                    let _ = writeln!(out, "  - {} -> cancelled", query.query);
                }
            }
        }
    }

    let total = report.total_queries();
    let collected = report.total_collected();
    let _ = writeln!(
        out,
        "\nCollected: {} / {} ({:.1}%)",
        collected,
        total,
        percent(collected, total)
    );
    out
}

/// Formats a `survey` run: totals, failure breakdown and top entities
pub fn format_survey_summary(report: &SurveyReport) -> String {
    let total = report.total();
    let success = report.success_count();
    let failed = total - success;

    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "SURVEY SUMMARY: {}", report.source);
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "\nTotal entities surveyed: {}", total);
    let _ = writeln!(
        out,
        "Successful: {} ({:.1}%)",
        success,
        report.success_rate()
    );
    let _ = writeln!(out, "Failed: {} ({:.1}%)", failed, percent(failed, total));

    if let Some(reason) = &report.crawl_failure {
        let _ = writeln!(out, "Catalog crawl stopped early: {}", reason);
    }
    if report.cancelled {
        let _ = writeln!(out, "Survey was cancelled before completion");
    }

    let breakdown = report.failure_breakdown();
    if !breakdown.is_empty() {
        let _ = writeln!(out, "\n{}", THIN_RULE);
        let _ = writeln!(out, "FAILURE BREAKDOWN");
        let _ = writeln!(out, "{}", THIN_RULE);

        for (category, entries) in breakdown {
            let _ = writeln!(
                out,
                "\n{}: {} ({:.1}%)",
                category,
                entries.len(),
                percent(entries.len(), total)
            );
            for entry in entries.iter().take(BREAKDOWN_EXAMPLES) {
                let _ = writeln!(out, "  - {}", clip(&entry.entity.title, 60));
            }
            if entries.len() > BREAKDOWN_EXAMPLES {
                let _ = writeln!(
                    out,
                    "  ... and {} more",
                    entries.len() - BREAKDOWN_EXAMPLES
                );
            }
        }
    }

    let top = report.top_by_chapter_count(TOP_ENTITIES);
    if !top.is_empty() {
        let _ = writeln!(out, "\n{}", THIN_RULE);
        let _ = writeln!(out, "TOP {} BY CHAPTER COUNT", TOP_ENTITIES);
        let _ = writeln!(out, "{}", THIN_RULE);

        for (idx, (entity, count)) in top.into_iter().enumerate() {
            let _ = writeln!(
                out,
                "{:2}. {:50} - {:4} chapters",
                idx + 1,
                clip(&entity.title, 50),
                count
            );
        }
    }

    out
}

/// Prints [`format_collection_summary`] to stdout
pub fn print_collection_summary(report: &CollectionReport) {
    println!("{}", format_collection_summary(report));
}

/// Prints [`format_survey_summary`] to stdout
pub fn print_survey_summary(report: &SurveyReport) {
    println!("{}", format_survey_summary(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{
        FailureCategory, QueryReport, SourceReport, SurveyEntry, SurveyStatus,
    };
    use crate::crawler::Entity;
    use chrono::Utc;

    fn entry(id: &str, status: SurveyStatus) -> SurveyEntry {
        SurveyEntry {
            entity: Entity::new(id, format!("Title {}", id)),
            status,
        }
    }

    fn not_found() -> SurveyStatus {
        SurveyStatus::Failed {
            category: FailureCategory::NotFound,
            error: "HTTP 404".to_string(),
        }
    }

    #[test]
    fn test_clip_counts_characters() {
        assert_eq!(clip("ワンピース", 3), "ワンピ");
        assert_eq!(clip("abc", 10), "abc");
    }

    #[test]
    fn test_survey_summary() {
        let mut entries: Vec<_> = (0..5).map(|i| entry(&format!("nf{}", i), not_found())).collect();
        entries.push(entry("big", SurveyStatus::Success { chapter_count: 120 }));
        entries.push(entry("small", SurveyStatus::Success { chapter_count: 4 }));

        let report = SurveyReport {
            generated_at: Utc::now(),
            config_hash: None,
            source: "mangalek".to_string(),
            reached_end: true,
            crawl_failure: None,
            cancelled: false,
            entries,
        };

        let summary = format_survey_summary(&report);
        assert!(summary.contains("Total entities surveyed: 7"));
        assert!(summary.contains("Successful: 2 (28.6%)"));
        assert!(summary.contains("Not found (404): 5 (71.4%)"));
        assert!(summary.contains("  ... and 2 more"));
        assert!(summary.find("Title big").unwrap() < summary.find("Title small").unwrap());
    }

    #[test]
    fn test_collection_summary() {
        let report = CollectionReport::new(vec![SourceReport {
            source: "mangahere".to_string(),
            queries: vec![
                QueryReport {
                    query: "Berserk".to_string(),
                    outcome: QueryOutcome::NoResults,
                },
                QueryReport {
                    query: "Naruto".to_string(),
                    outcome: QueryOutcome::Failed {
                        category: FailureCategory::RateLimited,
                        attempts: 5,
                        error: "retries exhausted".to_string(),
                    },
                },
            ],
        }]);

        let summary = format_collection_summary(&report);
        assert!(summary.contains("mangahere (0 / 2 queries collected)"));
        assert!(summary.contains("Berserk -> no search results"));
        assert!(summary.contains("Naruto -> Rate limit exceeded (429) after 5 attempt(s)"));
        assert!(summary.contains("Collected: 0 / 2 (0.0%)"));
    }
}
