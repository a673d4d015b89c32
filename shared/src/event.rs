use serde::{Deserialize, Serialize};

use crate::capabilities::StoreError;
use crate::diagnosis::TreatmentKind;
use crate::i18n::Language;
use crate::model::{AppConfig, CapturedImage, Screen};
use crate::records::{FaqEntry, RecordId, ReminderRecord, ScanRecord, ShoppingItemRecord};

// --- Event enum: shell-originated triggers first, capability responses last.
// Large payloads are boxed.

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Onboarding
    LanguageSelected(Language),
    TutorialAdvanced,
    TutorialSkipped,

    // Capture and analysis
    ImageCaptured(Box<CapturedImage>),
    CancelProcessing,
    RetakeRequested,
    AddToShoppingRequested {
        kind: TreatmentKind,
    },
    SetReminderRequested {
        kind: TreatmentKind,
    },
    SpeakRequested {
        text: String,
    },

    // Navigation
    NavigateTo(Screen),
    BackRequested,
    ScanSelected {
        id: RecordId,
    },

    // Reminders and shopping
    ToggleReminderCompleted {
        id: RecordId,
    },
    DeleteReminder {
        id: RecordId,
    },
    TogglePurchased {
        id: RecordId,
    },
    DeleteShoppingItem {
        id: RecordId,
    },

    // Chat
    FaqCategorySelected(Option<String>),
    FaqSelected {
        id: RecordId,
    },
    ChatQuestionSubmitted {
        text: String,
    },

    // Shell housekeeping
    ConfigUpdated(Box<AppConfig>),
    DismissNotice,
    Noop,

    // Capability responses
    #[serde(skip)]
    AnalysisReady {
        generation: u64,
    },
    #[serde(skip)]
    ScanSaved {
        generation: u64,
        result: Result<RecordId, StoreError>,
    },
    #[serde(skip)]
    ReminderCreated {
        generation: u64,
        result: Result<RecordId, StoreError>,
    },
    #[serde(skip)]
    ShoppingItemCreated {
        generation: u64,
        result: Result<RecordId, StoreError>,
    },
    /// List responses carry the screen visit that asked for them.
    #[serde(skip)]
    ScansLoaded {
        visit: u64,
        result: Result<Vec<ScanRecord>, StoreError>,
    },
    #[serde(skip)]
    RemindersLoaded {
        visit: u64,
        result: Result<Vec<ReminderRecord>, StoreError>,
    },
    #[serde(skip)]
    ShoppingLoaded {
        visit: u64,
        result: Result<Vec<ShoppingItemRecord>, StoreError>,
    },
    #[serde(skip)]
    FaqsLoaded {
        visit: u64,
        result: Result<Vec<FaqEntry>, StoreError>,
    },
    #[serde(skip)]
    ReminderUpdated {
        id: RecordId,
        completed: bool,
        result: Result<(), StoreError>,
    },
    #[serde(skip)]
    ReminderDeleted {
        id: RecordId,
        result: Result<(), StoreError>,
    },
    #[serde(skip)]
    ShoppingItemUpdated {
        id: RecordId,
        purchased: bool,
        result: Result<(), StoreError>,
    },
    #[serde(skip)]
    ShoppingItemDeleted {
        id: RecordId,
        result: Result<(), StoreError>,
    },
}

impl Event {
    /// Stable name used in log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LanguageSelected(_) => "language_selected",
            Self::TutorialAdvanced => "tutorial_advanced",
            Self::TutorialSkipped => "tutorial_skipped",
            Self::ImageCaptured(_) => "image_captured",
            Self::CancelProcessing => "cancel_processing",
            Self::RetakeRequested => "retake_requested",
            Self::AddToShoppingRequested { .. } => "add_to_shopping_requested",
            Self::SetReminderRequested { .. } => "set_reminder_requested",
            Self::SpeakRequested { .. } => "speak_requested",
            Self::NavigateTo(_) => "navigate_to",
            Self::BackRequested => "back_requested",
            Self::ScanSelected { .. } => "scan_selected",
            Self::ToggleReminderCompleted { .. } => "toggle_reminder_completed",
            Self::DeleteReminder { .. } => "delete_reminder",
            Self::TogglePurchased { .. } => "toggle_purchased",
            Self::DeleteShoppingItem { .. } => "delete_shopping_item",
            Self::FaqCategorySelected(_) => "faq_category_selected",
            Self::FaqSelected { .. } => "faq_selected",
            Self::ChatQuestionSubmitted { .. } => "chat_question_submitted",
            Self::ConfigUpdated(_) => "config_updated",
            Self::DismissNotice => "dismiss_notice",
            Self::Noop => "noop",
            Self::AnalysisReady { .. } => "analysis_ready",
            Self::ScanSaved { .. } => "scan_saved",
            Self::ReminderCreated { .. } => "reminder_created",
            Self::ShoppingItemCreated { .. } => "shopping_item_created",
            Self::ScansLoaded { .. } => "scans_loaded",
            Self::RemindersLoaded { .. } => "reminders_loaded",
            Self::ShoppingLoaded { .. } => "shopping_loaded",
            Self::FaqsLoaded { .. } => "faqs_loaded",
            Self::ReminderUpdated { .. } => "reminder_updated",
            Self::ReminderDeleted { .. } => "reminder_deleted",
            Self::ShoppingItemUpdated { .. } => "shopping_item_updated",
            Self::ShoppingItemDeleted { .. } => "shopping_item_deleted",
        }
    }

    /// True for events that come straight from a user gesture in the shell.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::ConfigUpdated(_)
                | Self::Noop
                | Self::AnalysisReady { .. }
                | Self::ScanSaved { .. }
                | Self::ReminderCreated { .. }
                | Self::ShoppingItemCreated { .. }
                | Self::ScansLoaded { .. }
                | Self::RemindersLoaded { .. }
                | Self::ShoppingLoaded { .. }
                | Self::FaqsLoaded { .. }
                | Self::ReminderUpdated { .. }
                | Self::ReminderDeleted { .. }
                | Self::ShoppingItemUpdated { .. }
                | Self::ShoppingItemDeleted { .. }
        )
    }
}
