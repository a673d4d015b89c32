// lib.rs - AgriVaani shared core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod chat;
pub mod diagnosis;
pub mod event;
pub mod i18n;
pub mod image_processing;
pub mod model;
pub mod records;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use diagnosis::{
    CategorySource, Diagnosis, DiagnosisEngine, DiagnosisError, DiseaseCategory, FixedCategory,
    RandomCategory, Treatment, TreatmentKind,
};
pub use event::Event;
pub use i18n::{Language, TextKey};
pub use model::{AppConfig, AppState, CapturedImage, Model};
pub use records::{
    FaqEntry, ItemType, NewReminder, NewScanRecord, NewShoppingItem, RecordId, ReminderRecord,
    ScanRecord, ShoppingItemRecord,
};
pub use view::{ScreenView, ViewModel};

pub const TUTORIAL_STEP_COUNT: usize = 2;
pub const DEFAULT_ANALYSIS_DELAY_MS: u64 = 2000;
pub const MS_PER_HOUR: u64 = 60 * 60 * 1000;
pub const DEFAULT_REMINDER_LEAD_MS: u64 = 24 * MS_PER_HOUR;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SPEECH_RATE: f32 = 0.8;
pub const HISTORY_CAUSE_PREVIEW: usize = 2;
pub const MAX_CHAT_MESSAGES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Logged only, never shown.
    Silent,
    /// Shown as a soft notice; the visible state is untouched.
    Notice,
    /// The user is routed back to a stable screen with a retry affordance.
    Recoverable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ClassificationFailed,
    PersistenceFailed,
    StaleResult,
    LookupMiss,
    InvalidState,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ClassificationFailed => "CLASSIFICATION_FAILED",
            Self::PersistenceFailed => "PERSISTENCE_FAILED",
            Self::StaleResult => "STALE_RESULT",
            Self::LookupMiss => "LOOKUP_MISS",
            Self::InvalidState => "INVALID_STATE",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::StaleResult | Self::LookupMiss => ErrorSeverity::Silent,
            Self::PersistenceFailed => ErrorSeverity::Notice,
            Self::ClassificationFailed | Self::InvalidState => ErrorSeverity::Recoverable,
        }
    }

    /// Whether the user can fix the failure by repeating the action by hand.
    /// Nothing in the core retries automatically.
    #[must_use]
    pub const fn is_user_retryable(self) -> bool {
        matches!(self, Self::ClassificationFailed | Self::PersistenceFailed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_user_retryable(&self) -> bool {
        self.kind.is_user_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self, language: Language) -> String {
        let text = match (self.kind, language) {
            (ErrorKind::ClassificationFailed, Language::English) => {
                "Analysis failed. Please try again with a clearer image."
            }
            (ErrorKind::ClassificationFailed, Language::Telugu) => {
                "విశ్లేషణ విఫలమైంది. దయచేసి స్పష్టమైన ఫోటోతో మళ్లీ ప్రయత్నించండి."
            }
            (ErrorKind::PersistenceFailed, Language::English) => {
                "Could not save. Please check your connection and try again."
            }
            (ErrorKind::PersistenceFailed, Language::Telugu) => {
                "సేవ్ చేయలేకపోయాం. మీ కనెక్షన్ తనిఖీ చేసి మళ్లీ ప్రయత్నించండి."
            }
            (ErrorKind::InvalidState, Language::English) => {
                "Something went wrong. Please start again."
            }
            (ErrorKind::InvalidState, Language::Telugu) => {
                "ఏదో తప్పు జరిగింది. దయచేసి మళ్లీ ప్రారంభించండి."
            }
            (ErrorKind::StaleResult | ErrorKind::LookupMiss, _) => return self.message.clone(),
        };
        text.to_string()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<DiagnosisError> for AppError {
    fn from(e: DiagnosisError) -> Self {
        AppError::new(ErrorKind::ClassificationFailed, e.to_string())
    }
}

impl From<capabilities::StoreError> for AppError {
    fn from(e: capabilities::StoreError) -> Self {
        AppError::new(ErrorKind::PersistenceFailed, e.to_string())
    }
}

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Short relative label for a due time, e.g. `Overdue`, `5h`, `2d`.
/// Hours round up, so anything due within the next hour reads `1h`.
#[must_use]
pub fn format_time_remaining(due_ms: u64, now_ms: u64, language: Language) -> String {
    if due_ms < now_ms {
        return i18n::resolve(TextKey::Overdue, language).to_string();
    }
    let hours = (due_ms - now_ms).div_ceil(MS_PER_HOUR);
    let (hour_suffix, day_suffix) = match language {
        Language::English => ("h", "d"),
        Language::Telugu => ("గం", "రో"),
    };
    if hours < 24 {
        format!("{hours}{hour_suffix}")
    } else {
        format!("{}{day_suffix}", hours.div_ceil(24))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}
