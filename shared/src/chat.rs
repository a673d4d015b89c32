//! FAQ chat transcript.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::{resolve, Language, TextKey};
use crate::records::FaqEntry;
use crate::MAX_CHAT_MESSAGES;

/// Words shorter than this are ignored when matching free text.
const MIN_MATCH_WORD_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub is_user: bool,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Starts a fresh transcript with the greeting in `language`.
    pub fn greet(&mut self, language: Language, now_ms: u64) {
        self.clear();
        self.push_bot(resolve(TextKey::ChatGreeting, language), now_ms);
    }

    pub fn push_user(&mut self, text: impl Into<String>, now_ms: u64) {
        self.push(text.into(), true, now_ms);
    }

    pub fn push_bot(&mut self, text: impl Into<String>, now_ms: u64) {
        self.push(text.into(), false, now_ms);
    }

    fn push(&mut self, text: String, is_user: bool, at_ms: u64) {
        if self.messages.len() >= MAX_CHAT_MESSAGES {
            let overflow = self.messages.len() + 1 - MAX_CHAT_MESSAGES;
            self.messages.drain(..overflow);
        }
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            text,
            is_user,
            at_ms,
        });
    }
}

/// FAQs in `category`, or all of them for `None`.
pub fn faqs_in_category<'a>(
    faqs: &'a [FaqEntry],
    category: Option<&'a str>,
) -> impl Iterator<Item = &'a FaqEntry> + 'a {
    faqs.iter()
        .filter(move |f| category.map_or(true, |c| f.category == c))
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(faqs: &[FaqEntry]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for faq in faqs {
        if !out.contains(&faq.category) {
            out.push(faq.category.clone());
        }
    }
    out
}

/// Best keyword match for a free-text question. Questions in both languages
/// are searched; the entry sharing the most words wins and ties go to the
/// earlier entry.
#[must_use]
pub fn best_match<'a>(question: &str, faqs: &'a [FaqEntry]) -> Option<&'a FaqEntry> {
    let question = question.to_lowercase();
    let words: Vec<&str> = question
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_MATCH_WORD_CHARS)
        .collect();
    if words.is_empty() {
        return None;
    }

    let mut best: Option<(&FaqEntry, usize)> = None;
    for faq in faqs.iter().filter(|f| f.is_active) {
        let haystack = format!("{} {}", faq.question_en, faq.question_te).to_lowercase();
        let score = words.iter().filter(|w| haystack.contains(**w)).count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((faq, score));
        }
    }
    best.map(|(faq, _)| faq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordId;

    fn faq(id: &str, question_en: &str, category: &str) -> FaqEntry {
        FaqEntry {
            id: RecordId::new(id),
            question_te: String::new(),
            question_en: question_en.into(),
            answer_te: format!("{id} జవాబు"),
            answer_en: format!("{id} answer"),
            category: category.into(),
            is_active: true,
        }
    }

    #[test]
    fn greeting_replaces_old_messages() {
        let mut chat = ChatTranscript::default();
        chat.push_user("hi", 1);
        chat.greet(Language::English, 2);
        assert_eq!(chat.len(), 1);
        assert!(!chat.messages()[0].is_user);
        assert!(chat.messages()[0].text.starts_with("Hello!"));
    }

    #[test]
    fn transcript_is_capped() {
        let mut chat = ChatTranscript::default();
        for i in 0..(MAX_CHAT_MESSAGES + 5) {
            chat.push_user(i.to_string(), 0);
        }
        assert_eq!(chat.len(), MAX_CHAT_MESSAGES);
        assert_eq!(chat.messages()[0].text, "5");
    }

    #[test]
    fn best_match_counts_shared_words() {
        let faqs = vec![
            faq("1", "How do I treat leaf rust?", "disease"),
            faq("2", "When should I spray neem oil on leaves?", "treatment"),
        ];
        let hit = best_match("spray neem oil", &faqs).unwrap();
        assert_eq!(hit.id.as_str(), "2");
        assert_eq!(best_match("Rust", &faqs).unwrap().id.as_str(), "1");
        assert!(best_match("tractor loan", &faqs).is_none());
        assert!(best_match("a ?", &faqs).is_none());
    }

    #[test]
    fn inactive_entries_never_match() {
        let mut entry = faq("1", "How do I treat leaf rust?", "disease");
        entry.is_active = false;
        assert!(best_match("leaf rust", &[entry]).is_none());
    }

    #[test]
    fn category_filter() {
        let faqs = vec![
            faq("1", "a", "disease"),
            faq("2", "b", "soil"),
            faq("3", "c", "disease"),
        ];
        assert_eq!(faqs_in_category(&faqs, None).count(), 3);
        let ids: Vec<_> = faqs_in_category(&faqs, Some("disease"))
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(categories(&faqs), ["disease", "soil"]);
    }
}
