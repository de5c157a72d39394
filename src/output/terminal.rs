// Colored terminal output for topic reports and skipped runs.

use colored::Colorize;

use super::topic_label;
use crate::pipeline::orchestrator::{RunKind, RunOutcome};
use crate::report::{EntityMentions, EntityVolume, TopicReport};

const BAR_WIDTH: usize = 20;
const TOP_ENTITIES: usize = 20;

/// Display one run's outcome: the report, or why there is none.
pub fn display_outcome(outcome: &RunOutcome) {
    match &outcome.result {
        Ok(report) => display_report(report, outcome.kind),
        Err(failure) => {
            println!(
                "\n{} {}: {}",
                "Skipped".yellow().bold(),
                outcome.label.bold(),
                failure
            );
        }
    }
}

/// Display a topic report as term lists plus a share chart.
pub fn display_report(report: &TopicReport, kind: RunKind) {
    let scope = match kind {
        RunKind::Source => "Source",
        RunKind::Combined => "Combined",
    };
    println!(
        "\n{}",
        format!("=== {scope}: {} ({} documents) ===", report.label, report.documents).bold()
    );
    println!(
        "  {} modeled, {} vocabulary terms, {} topics",
        report.modeled_documents, report.vocabulary_size, report.num_topics
    );
    if let Some(range) = &report.date_range {
        println!(
            "  Posts from {} to {}",
            range.earliest.format("%Y-%m-%d %H:%M"),
            range.latest.format("%Y-%m-%d %H:%M")
        );
    }
    println!();

    for topic in &report.topics {
        let terms: Vec<String> = topic
            .terms
            .iter()
            .map(|t| format!("{} {}", t.term, format!("{:.3}", t.weight).dimmed()))
            .collect();
        println!("  {:<9} {}", topic_label(topic.topic).bold(), terms.join("  "));
    }

    println!();
    display_shares(report);
    display_entity_volume(&report.entity_volume);
}

fn display_shares(report: &TopicReport) {
    if report.shares.is_empty() {
        println!(
            "  {}",
            "No document could be assigned a dominant topic.".dimmed()
        );
        return;
    }

    println!(
        "  {}",
        format!(
            "Dominant topic share ({} documents assigned)",
            report.assigned_documents
        )
        .dimmed()
    );
    for share in &report.shares {
        let filled = ((share.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.min(BAR_WIDTH)),
            " ".repeat(BAR_WIDTH.saturating_sub(filled))
        );
        let colored_bar = if share.percentage >= 40.0 {
            bar.bright_green()
        } else if share.percentage >= 15.0 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };
        println!(
            "  {:<9} {} {:>6.2}% ({}/{})",
            topic_label(share.topic),
            colored_bar,
            share.percentage,
            share.documents,
            report.assigned_documents
        );
    }
}

fn display_entity_volume(volume: &EntityVolume) {
    if volume.overall.is_empty() {
        return;
    }
    println!();
    println!("  {}", format!("Most mentioned entities (top {TOP_ENTITIES})").dimmed());
    print_mentions(&volume.overall);

    if let Some(split) = &volume.cutoff {
        let at = split.at.format("%Y-%m-%d %H:%M");
        println!(
            "\n  {}",
            format!("Up to {at} ({} documents)", split.documents_before).dimmed()
        );
        print_mentions(&split.before);
        println!(
            "\n  {}",
            format!("After {at} ({} documents)", split.documents_after).dimmed()
        );
        print_mentions(&split.after);
    }
}

fn print_mentions(ranked: &[EntityMentions]) {
    if ranked.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for (rank, entry) in ranked.iter().take(TOP_ENTITIES).enumerate() {
        println!("    {:>2}. {} {}", rank + 1, entry.entity, entry.mentions);
    }
}
