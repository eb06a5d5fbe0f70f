//! Conversation heuristics over two resolved transcript legs.
//!
//! Pure functions; the correlator does all I/O before calling in here.

use deep_validate_core::SentenceRecord;

use crate::models::conversation::{ConversationStats, LegStats, TwoWayOptions};

/// One call leg with its transcript sentences.
#[derive(Debug, Clone, Default)]
pub struct Leg {
    pub label: &'static str,
    pub stats: LegStats,
    pub sentences: Vec<SentenceRecord>,
}

impl Leg {
    fn transcript_completed(&self) -> bool {
        self.stats
            .transcript_status
            .as_deref()
            .map_or(false, |s| s.eq_ignore_ascii_case("completed"))
    }
}

/// Conversation statistics plus the errors and warnings they imply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationAnalysis {
    pub stats: ConversationStats,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

fn split_found(terms: &[String], haystack: &str) -> (Vec<String>, Vec<String>) {
    terms
        .iter()
        .map(|t| t.to_string())
        .partition(|t| haystack.contains(&t.to_lowercase()))
}

/// Evaluate keyword, phrase, turn and sentence thresholds for two legs.
pub fn analyze_conversation(a: &Leg, b: &Leg, options: &TwoWayOptions) -> ConversationAnalysis {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let text = a
        .sentences
        .iter()
        .chain(b.sentences.iter())
        .map(|s| s.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let (topic_found, topic_missing) = split_found(&options.topic_keywords, &text);
    if !topic_missing.is_empty() {
        warnings.push(format!("Topic keywords not found: {}", topic_missing.join(", ")));
    }

    let (phrases_found, _) = split_found(&options.success_phrases, &text);
    if !options.success_phrases.is_empty() && phrases_found.is_empty() {
        errors.push("No success phrases found in conversation".to_string());
    }

    let (forbidden_found, _) = split_found(&options.forbidden_patterns, &text);
    if !forbidden_found.is_empty() {
        errors.push(format!("Forbidden patterns found: {}", forbidden_found.join(", ")));
    }

    let total_turns = a.stats.speaker_turns + b.stats.speaker_turns;
    if let Some(expected) = options.expected_turns {
        if total_turns < expected {
            errors.push(format!(
                "Expected at least {} turns, got {}",
                expected, total_turns
            ));
        }
    }

    if let Some(minimum) = options.min_sentences_per_side {
        for leg in [a, b] {
            if leg.transcript_completed() && leg.stats.sentence_count < minimum {
                errors.push(format!(
                    "{} ({}) has only {} sentences, expected at least {}",
                    leg.label, leg.stats.call_sid, leg.stats.sentence_count, minimum
                ));
            }
        }
    }

    if let Some(secs) = options.min_duration_secs {
        warnings.push(format!(
            "Minimum duration of {}s cannot be verified from transcript data",
            secs
        ));
    }

    ConversationAnalysis {
        stats: ConversationStats {
            total_turns,
            topic_keywords_found: topic_found,
            topic_keywords_missing: topic_missing,
            success_phrases_found: phrases_found,
            forbidden_patterns_found: forbidden_found,
            has_natural_flow: a.stats.speaker_turns >= 1 && b.stats.speaker_turns >= 1,
        },
        errors,
        warnings,
    }
}
