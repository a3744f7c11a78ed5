//! Keyword-based priority classification.

/// Message priority derived from keyword classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

/// High-priority indicators for email subjects, senders and snippets.
const EMAIL_HIGH_KEYWORDS: &[&str] = &[
    "urgent", "asap", "important", "deadline", "invoice", "payment", "money", "billing", "due",
    "critical",
];

/// High-priority indicators for chat previews.
const CHAT_HIGH_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "emergency",
    "immediate",
    "critical",
    "help",
    "problem",
    "issue",
    "payment",
];

/// Medium-priority indicators for chat previews.
const CHAT_MEDIUM_KEYWORDS: &[&str] = &[
    "soon", "today", "request", "please", "question", "inquiry", "details", "meeting",
];

/// Ordered keyword tiers; the first tier containing a match wins.
///
/// Classification is total: input that matches no tier falls back to the
/// baseline priority.
#[derive(Debug, Clone)]
pub struct PriorityRules {
    tiers: Vec<(Priority, &'static [&'static str])>,
    baseline: Priority,
}

impl PriorityRules {
    pub fn new(tiers: Vec<(Priority, &'static [&'static str])>, baseline: Priority) -> Self {
        Self { tiers, baseline }
    }

    /// Keyword table used for email messages.
    pub fn email() -> Self {
        Self::new(vec![(Priority::High, EMAIL_HIGH_KEYWORDS)], Priority::Normal)
    }

    /// Keyword table used for chat messages.
    pub fn chat() -> Self {
        Self::new(
            vec![
                (Priority::High, CHAT_HIGH_KEYWORDS),
                (Priority::Medium, CHAT_MEDIUM_KEYWORDS),
            ],
            Priority::Low,
        )
    }

    /// Classify `text` against the tiers in precedence order.
    pub fn classify(&self, text: &str) -> Priority {
        let haystack = text.to_lowercase();

        for (priority, keywords) in &self.tiers {
            if keywords.iter().any(|kw| haystack.contains(kw)) {
                return *priority;
            }
        }

        self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_invoice_asap_is_high() {
        let rules = PriorityRules::email();
        assert_eq!(
            rules.classify("Please send the invoice ASAP"),
            Priority::High
        );
    }

    #[test]
    fn test_email_no_match_is_normal() {
        let rules = PriorityRules::email();
        assert_eq!(rules.classify("Weekly newsletter"), Priority::Normal);
    }

    #[test]
    fn test_chat_tiers_checked_in_order() {
        let rules = PriorityRules::chat();
        // "urgent" (high) outranks "please" (medium) even when both match.
        assert_eq!(
            rules.classify("please reply, this is urgent"),
            Priority::High
        );
        assert_eq!(rules.classify("please reply"), Priority::Medium);
        assert_eq!(rules.classify("see you tomorrow"), Priority::Low);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let rules = PriorityRules::chat();
        assert_eq!(rules.classify("EMERGENCY at the office"), Priority::High);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let rules = PriorityRules::email();
        let text = "payment due by friday";
        assert_eq!(rules.classify(text), rules.classify(text));
    }
}
