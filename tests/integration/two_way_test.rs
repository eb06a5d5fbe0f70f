//! Two-Way Conversation Integration Tests

use tempfile::TempDir;

use deep_validate::TwoWayOptions;

use super::fake_client::*;
use super::{fast_config, validator_with};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_completed_conversation_passes() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTA", "CAA", "completed"),
            transcript("GTB", "CAB", "completed"),
        ];
        s.sentences
            .ok("GTA", sentences(&["I need an appointment", "Tuesday works"]))
            .ok("GTB", sentences(&["Let me schedule that", "I confirm Tuesday at ten"]));
    });

    let options = TwoWayOptions {
        topic_keywords: strings(&["appointment", "schedule", "confirm"]),
        success_phrases: strings(&["confirm tuesday"]),
        expected_turns: Some(4),
        min_sentences_per_side: Some(2),
        ..TwoWayOptions::default()
    };
    let result = validator.validate_two_way("CAA", "CAB", &options).await.unwrap();

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.call_a.transcript_sid.as_deref(), Some("GTA"));
    assert_eq!(result.call_b.transcript_sid.as_deref(), Some("GTB"));
    assert_eq!(
        result.conversation.total_turns,
        result.call_a.speaker_turns + result.call_b.speaker_turns
    );
    assert_eq!(result.conversation.total_turns, 4);
    assert!(result.conversation.topic_keywords_missing.is_empty());
    assert!(result.conversation.has_natural_flow);
}

#[tokio::test]
async fn test_forbidden_pattern_fails_conversation() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTC", "CAC", "completed"),
            transcript("GTD", "CAD", "completed"),
        ];
        s.sentences
            .ok("GTC", sentences(&["Can you check my order?"]))
            .ok("GTD", sentences(&["Sorry, an error occurred while looking it up"]));
    });

    let options = TwoWayOptions {
        forbidden_patterns: strings(&["error occurred", "transfer failed"]),
        ..TwoWayOptions::default()
    };
    let result = validator.validate_two_way("CAC", "CAD", &options).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.conversation.forbidden_patterns_found, strings(&["error occurred"]));
    assert_eq!(result.errors, vec!["Forbidden patterns found: error occurred"]);
}

#[tokio::test]
async fn test_missing_transcript_is_reported_per_leg() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![transcript("GTA", "CAA", "completed")];
        s.sentences.ok("GTA", sentences(&["hello?"]));
    });

    let result = validator
        .validate_two_way("CAA", "CAB", &TwoWayOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.errors, vec!["No transcript found for call CAB"]);
    assert_eq!(result.call_b.transcript_sid, None);
    assert!(!result.conversation.has_natural_flow);
}

#[tokio::test]
async fn test_incomplete_transcript_without_waiting_fails_fast() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTA", "CAA", "completed"),
            transcript("GTB", "CAB", "in-progress"),
        ];
        s.sentences.ok("GTA", sentences(&["hello"]));
    });

    let result = validator
        .validate_two_way("CAA", "CAB", &TwoWayOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result
        .errors
        .contains(&"Transcript GTB not completed (status: in-progress)".to_string()));
    assert_eq!(client.fetch_count("GTB"), 0);
}

#[tokio::test]
async fn test_waits_for_transcript_when_asked() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTA", "CAA", "completed"),
            transcript("GTB", "CAB", "queued"),
        ];
        s.transcript_fetches
            .ok("GTB", transcript("GTB", "CAB", "in-progress"))
            .ok("GTB", transcript("GTB", "CAB", "completed"));
        s.sentences
            .ok("GTA", sentences(&["hello"]))
            .ok("GTB", sentences(&["hi"]));
    });

    let options = TwoWayOptions {
        wait_for_transcripts: true,
        ..TwoWayOptions::default()
    };
    let result = validator.validate_two_way("CAA", "CAB", &options).await.unwrap();

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.call_b.transcript_status.as_deref(), Some("completed"));
    assert_eq!(client.fetch_count("GTB"), 2);
}

#[tokio::test]
async fn test_first_listed_transcript_is_used() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTA1", "CAA", "completed"),
            transcript("GTA2", "CAA", "completed"),
            transcript("GTB", "CAB", "completed"),
        ];
        s.sentences
            .ok("GTA1", sentences(&["first"]))
            .ok("GTA2", sentences(&["second", "transcript"]))
            .ok("GTB", sentences(&["other side"]));
    });

    let result = validator
        .validate_two_way("CAA", "CAB", &TwoWayOptions::default())
        .await
        .unwrap();

    assert_eq!(result.call_a.transcript_sid.as_deref(), Some("GTA1"));
    assert_eq!(result.call_a.sentence_count, 1);
}

#[tokio::test]
async fn test_absent_success_phrases_fail() {
    let temp = TempDir::new().unwrap();
    let (client, validator) = validator_with(fast_config(temp.path()));
    client.script(|s| {
        s.transcripts = vec![
            transcript("GTA", "CAA", "completed"),
            transcript("GTB", "CAB", "completed"),
        ];
        s.sentences
            .ok("GTA", sentences(&["hello there"]))
            .ok("GTB", sentences(&["see you"]));
    });

    let options = TwoWayOptions {
        success_phrases: strings(&["goodbye forever", "purchase completed"]),
        min_duration_secs: Some(30),
        ..TwoWayOptions::default()
    };
    let result = validator.validate_two_way("CAA", "CAB", &options).await.unwrap();

    assert!(!result.success);
    assert!(result
        .errors
        .contains(&"No success phrases found in conversation".to_string()));
    assert_eq!(result.warnings.len(), 1);
}
