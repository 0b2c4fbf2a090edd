//! Pure reference-resolution and topic-extraction functions, with no
//! dependency on session storage, so they are trivially unit-testable.

use crate::types::ConversationTurn;
use regex::Regex;
use std::sync::OnceLock;

const LOCATIONS: &[&str] = &[
    "new york",
    "california",
    "chicago",
    "boston",
    "san francisco",
    "los angeles",
];

const WEATHER_TERMS: &[&str] = &["weather", "winter", "summer", "temperature", "climate"];

fn reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(it|that|this|they|them)\b|\bthe above\b|\bthe previous\b|\bthe data\b").unwrap()
    })
}

/// True if `query` contains any whole-word reference token or phrase.
pub fn needs_resolution(query: &str) -> bool {
    reference_pattern().is_match(query)
}

/// Resolves pronoun/reference tokens in `query` against the most recent
/// turn, then appends an explicit context suffix if the result is still
/// short and ambiguous.
pub fn resolve_references(query: &str, last_turn: &ConversationTurn) -> String {
    let main_topic = extract_main_topic(&last_turn.user_query, &last_turn.agent_response);
    let subject = extract_subject(&last_turn.user_query);
    let response_snippet = truncate(&last_turn.agent_response, 100);

    let mut resolved = query.to_string();
    resolved = replace_word(&resolved, "it", &main_topic);
    resolved = replace_word(&resolved, "that", &main_topic);
    resolved = replace_word(&resolved, "this", &main_topic);
    resolved = replace_phrase(&resolved, "the above", &format!("the analysis: {response_snippet}..."));
    resolved = replace_phrase(
        &resolved,
        "the previous",
        &format!("the previous query about {subject}"),
    );
    resolved = replace_phrase(&resolved, "the data", &format!("the data from: {response_snippet}..."));

    let still_ambiguous = resolved.split_whitespace().count() < 5
        && ["it", "that", "this"]
            .iter()
            .any(|w| resolved.to_lowercase().contains(w));

    if still_ambiguous {
        let response_snippet_150 = truncate(&last_turn.agent_response, 150);
        resolved = format!(
            "{resolved} [Context: Previous query was '{}' with response about: {response_snippet_150}...]",
            last_turn.user_query
        );
    }

    resolved
}

/// Location+weather co-occurrence, then currency/exchange, then math,
/// then a fallback drawn from the previous response, matching the
/// original implementation's cascading heuristics.
pub fn extract_main_topic(prev_query: &str, prev_response: &str) -> String {
    let query_lower = prev_query.to_lowercase();

    if let Some(location) = LOCATIONS.iter().find(|loc| query_lower.contains(**loc)) {
        if let Some(weather_term) = WEATHER_TERMS.iter().find(|t| query_lower.contains(**t)) {
            return format!("{weather_term} in {location}");
        }
    }

    if query_lower.contains("currency") || query_lower.contains("exchange") {
        return "currency exchange analysis".into();
    }

    if query_lower.contains("math") || ['+', '-', '*', '/'].iter().any(|op| prev_query.contains(*op)) {
        return "mathematical calculation".into();
    }

    let meaningful: Vec<&str> = prev_response
        .split_whitespace()
        .take(10)
        .filter(|w| w.len() > 3)
        .take(3)
        .collect();

    if meaningful.is_empty() {
        "the previous analysis".into()
    } else {
        meaningful.join(" ")
    }
}

/// Last three whitespace-separated tokens of `query`, or the whole query
/// if it has two or fewer tokens.
pub fn extract_subject(query: &str) -> String {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.len() > 2 {
        words[words.len() - 3..].join(" ")
    } else {
        query.to_string()
    }
}

/// Scans the lowercased concatenation of a query and response and returns
/// the topic tags it should add to `active_topics`.
pub fn topics_for(user_query: &str, agent_response: &str) -> Vec<String> {
    let text = format!("{user_query} {agent_response}").to_lowercase();
    let mut topics = Vec::new();

    if WEATHER_TERMS.iter().any(|t| text.contains(t)) {
        topics.push("weather".to_string());
    }
    for city in LOCATIONS {
        if text.contains(city) {
            topics.push(format!("location:{city}"));
        }
    }
    if ["report", "analysis", "chart", "graph", "visualization"]
        .iter()
        .any(|w| text.contains(w))
    {
        topics.push("reporting".to_string());
    }
    if ["currency", "exchange", "dollar", "price", "market"]
        .iter()
        .any(|w| text.contains(w))
    {
        topics.push("finance".to_string());
    }

    topics
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
    Regex::new(&pattern).unwrap().replace_all(text, replacement.replace('$', "$$")).to_string()
}

fn replace_phrase(text: &str, phrase: &str, replacement: &str) -> String {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
    Regex::new(&pattern).unwrap().replace_all(text, replacement.replace('$', "$$")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(user_query: &str, agent_response: &str) -> ConversationTurn {
        ConversationTurn {
            timestamp: chrono::Utc::now(),
            user_query: user_query.into(),
            agent_name: "weather_agent".into(),
            agent_response: agent_response.into(),
            routing_confidence: 0.9,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn needs_resolution_detects_whole_word_tokens() {
        assert!(needs_resolution("what about it"));
        assert!(needs_resolution("tell me about the data"));
        assert!(!needs_resolution("critic and literary analysis"));
    }

    #[test]
    fn unrelated_query_is_untouched() {
        assert!(!needs_resolution("what is the capital of France"));
    }

    #[test]
    fn extract_main_topic_prefers_location_weather_cooccurrence() {
        let topic = extract_main_topic("what's the weather in Boston", "It will be sunny.");
        assert_eq!(topic, "weather in boston");
    }

    #[test]
    fn extract_main_topic_falls_back_to_currency() {
        let topic = extract_main_topic("what's the currency exchange rate", "...");
        assert_eq!(topic, "currency exchange analysis");
    }

    #[test]
    fn extract_main_topic_falls_back_to_math() {
        let topic = extract_main_topic("what is 2 + 2", "...");
        assert_eq!(topic, "mathematical calculation");
    }

    #[test]
    fn extract_main_topic_falls_back_to_response_words() {
        let topic = extract_main_topic("tell me something", "The quarterly revenue increased substantially");
        assert_eq!(topic, "quarterly revenue increased");
    }

    #[test]
    fn extract_subject_takes_last_three_words() {
        assert_eq!(extract_subject("what is the current exchange rate"), "current exchange rate");
        assert_eq!(extract_subject("hi"), "hi");
    }

    #[test]
    fn resolve_references_substitutes_pronoun() {
        let last = turn("what's the weather in Boston", "It will be sunny and 72 degrees.");
        let resolved = resolve_references("is it going to rain this week", &last);
        assert!(resolved.contains("weather in boston"));
    }

    #[test]
    fn resolve_references_appends_context_suffix_when_still_ambiguous() {
        let last = turn("what's the weather", "Sunny.");
        let resolved = resolve_references("and that?", &last);
        assert!(resolved.contains("[Context: Previous query was"));
    }

    #[test]
    fn topics_for_detects_weather_location_and_finance() {
        let topics = topics_for("weather in Chicago", "market prices are up");
        assert!(topics.contains(&"weather".to_string()));
        assert!(topics.contains(&"location:chicago".to_string()));
        assert!(topics.contains(&"finance".to_string()));
    }
}
