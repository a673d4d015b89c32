//! Record shapes exchanged with the record store. Ids and creation times are
//! assigned by the store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnosis::{Diagnosis, TreatmentKind};
use crate::i18n::Language;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScanRecord {
    pub image_url: String,
    pub diagnosis: Diagnosis,
    pub scanned_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: RecordId,
    pub image_url: String,
    pub diagnosis: Diagnosis,
    pub scanned_at_ms: u64,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReminder {
    pub treatment_name: String,
    pub due_at_ms: u64,
    pub scan_id: Option<RecordId>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub id: RecordId,
    pub treatment_name: String,
    pub due_at_ms: u64,
    pub is_completed: bool,
    pub scan_id: Option<RecordId>,
    pub notes: Option<String>,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Organic,
    Chemical,
}

impl From<TreatmentKind> for ItemType {
    fn from(kind: TreatmentKind) -> Self {
        match kind {
            TreatmentKind::Organic => ItemType::Organic,
            TreatmentKind::Chemical => ItemType::Chemical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShoppingItem {
    pub item_name: String,
    pub item_type: ItemType,
    pub quantity: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub estimated_price: Option<f64>,
    pub notes: Option<String>,
}

impl NewShoppingItem {
    #[must_use]
    pub fn named(item_name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            item_name: item_name.into(),
            item_type,
            quantity: None,
            supplier_name: None,
            supplier_contact: None,
            estimated_price: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItemRecord {
    pub id: RecordId,
    pub item_name: String,
    pub item_type: ItemType,
    pub is_purchased: bool,
    pub quantity: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub estimated_price: Option<f64>,
    pub notes: Option<String>,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: RecordId,
    pub question_te: String,
    pub question_en: String,
    pub answer_te: String,
    pub answer_en: String,
    pub category: String,
    pub is_active: bool,
}

impl FaqEntry {
    #[must_use]
    pub fn question(&self, language: Language) -> &str {
        match language {
            Language::Telugu => &self.question_te,
            Language::English => &self.question_en,
        }
    }

    #[must_use]
    pub fn answer(&self, language: Language) -> &str {
        match language {
            Language::Telugu => &self.answer_te,
            Language::English => &self.answer_en,
        }
    }
}

/// Newest scan first.
pub fn sort_scans(scans: &mut [ScanRecord]) {
    scans.sort_by(|a, b| b.scanned_at_ms.cmp(&a.scanned_at_ms));
}

/// Soonest due first.
pub fn sort_reminders(reminders: &mut [ReminderRecord]) {
    reminders.sort_by_key(|r| r.due_at_ms);
}

/// Newest item first.
pub fn sort_shopping(items: &mut [ShoppingItemRecord]) {
    items.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
}

/// Active entries only, grouped by category. The sort is stable so the
/// store's order survives within a category.
pub fn active_faqs(mut faqs: Vec<FaqEntry>) -> Vec<FaqEntry> {
    faqs.retain(|f| f.is_active);
    faqs.sort_by(|a, b| a.category.cmp(&b.category));
    faqs
}
