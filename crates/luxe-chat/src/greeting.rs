//! Salutation detection.
//!
//! Greetings get a canned welcome instead of a retrieval + generation round
//! trip.

/// Prefixes that mark a message as a greeting. Lowercase.
pub const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hiii",
    "hey there",
    "howdy",
    "greetings!",
    "hi there",
    "hello there",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Classifies messages as greetings by case-insensitive prefix match.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingDetector;

impl GreetingDetector {
    /// True if the trimmed, lowercased message starts with a known greeting.
    ///
    /// This is a plain prefix test: "hiking boots" counts as a greeting.
    pub fn is_greeting(&self, message: &str) -> bool {
        let normalized = message.trim().to_lowercase();
        GREETINGS.iter().any(|g| normalized.starts_with(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vocabulary_entry_matches_in_any_case() {
        let detector = GreetingDetector;
        for greeting in GREETINGS {
            assert!(detector.is_greeting(greeting), "{}", greeting);
            assert!(detector.is_greeting(&greeting.to_uppercase()), "{}", greeting);
            assert!(detector.is_greeting(&format!("  {}  ", greeting)), "{}", greeting);
        }
    }

    #[test]
    fn test_prefix_match() {
        let detector = GreetingDetector;
        assert!(detector.is_greeting("Hello"));
        assert!(detector.is_greeting("Good Morning, I need a coat"));
        assert!(detector.is_greeting("HEY! anyone there?"));
        assert!(detector.is_greeting("hiking boots please"));
    }

    #[test]
    fn test_non_greetings() {
        let detector = GreetingDetector;
        assert!(!detector.is_greeting("I need a dress"));
        assert!(!detector.is_greeting("I want red sneakers"));
        assert!(!detector.is_greeting("say hello to my little friend"));
        assert!(!detector.is_greeting("good night"));
        assert!(!detector.is_greeting(""));
        assert!(!detector.is_greeting("   "));
    }
}
