const GREETINGS: &[&str] = &["hi", "hello", "hey", "yo", "start"];
const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "headlines",
    "latest news",
    "tech news",
    "technology news",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    News,
    General,
}

/// Greeting beats news, news beats a general completion.
pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();

    if GREETINGS.contains(&normalized.as_str()) {
        Intent::Greeting
    } else if NEWS_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        Intent::News
    } else {
        Intent::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings() {
        assert_eq!(classify("hello"), Intent::Greeting);
        assert_eq!(classify("  Hey  "), Intent::Greeting);
        assert_eq!(classify("YO"), Intent::Greeting);
        assert_eq!(classify("start"), Intent::Greeting);
    }

    #[test]
    fn test_greeting_must_be_whole_message() {
        assert_eq!(classify("hello there"), Intent::General);
        assert_eq!(classify("hi, any news?"), Intent::News);
    }

    #[test]
    fn test_news_keywords() {
        assert_eq!(classify("latest news"), Intent::News);
        assert_eq!(classify("Show me the HEADLINES"), Intent::News);
        assert_eq!(classify("any technology news today?"), Intent::News);
    }

    #[test]
    fn test_general() {
        assert_eq!(classify("What is Python?"), Intent::General);
        assert_eq!(classify(""), Intent::General);
    }
}
