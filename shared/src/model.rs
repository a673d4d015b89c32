use serde::{Deserialize, Serialize};

use crate::chat::ChatTranscript;
use crate::diagnosis::{Diagnosis, DiagnosisEngine};
use crate::i18n::Language;
use crate::records::{FaqEntry, RecordId, ReminderRecord, ScanRecord, ShoppingItemRecord};
use crate::{
    get_current_time_ms, AppError, ToastKind, ToastMessage, DEFAULT_ANALYSIS_DELAY_MS,
    DEFAULT_REMINDER_LEAD_MS, DEFAULT_SPEECH_RATE, MAX_IMAGE_BYTES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Welcome,
    Tutorial,
    Main,
    Processing,
    Result,
    History,
    Reminders,
    Shopping,
    Chatbot,
}

impl AppState {
    /// Secondary screens reachable from Main that return to Main on back.
    #[must_use]
    pub const fn is_secondary(self) -> bool {
        matches!(
            self,
            Self::History | Self::Reminders | Self::Shopping | Self::Chatbot
        )
    }

    #[must_use]
    pub const fn can_capture(self) -> bool {
        matches!(self, Self::Main)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Tutorial => "tutorial",
            Self::Main => "main",
            Self::Processing => "processing",
            Self::Result => "result",
            Self::History => "history",
            Self::Reminders => "reminders",
            Self::Shopping => "shopping",
            Self::Chatbot => "chatbot",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screens that can be opened from Main.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    History,
    Reminders,
    Shopping,
    Chatbot,
}

impl From<Screen> for AppState {
    fn from(screen: Screen) -> Self {
        match screen {
            Screen::History => AppState::History,
            Screen::Reminders => AppState::Reminders,
            Screen::Shopping => AppState::Shopping,
            Screen::Chatbot => AppState::Chatbot,
        }
    }
}

/// An image handed over by the shell's camera or gallery picker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    #[serde(with = "serde_bytes")]
    pub source_bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub display_url: String,
    pub captured_at_ms: u64,
}

impl CapturedImage {
    /// Rebuilds a display-only image for a past scan; there are no bytes.
    #[must_use]
    pub fn from_history(display_url: impl Into<String>, captured_at_ms: u64) -> Self {
        Self {
            source_bytes: Vec::new(),
            file_name: String::new(),
            mime_type: String::new(),
            display_url: display_url.into(),
            captured_at_ms,
        }
    }

    /// The file name when present, otherwise the last path segment of the
    /// display URL.
    #[must_use]
    pub fn classification_key(&self) -> String {
        let name = self.file_name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        self.display_url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("bytes", &self.source_bytes.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("display_url", &self.display_url)
            .field("captured_at_ms", &self.captured_at_ms)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis_delay_ms: u64,
    pub reminder_lead_ms: u64,
    pub max_image_bytes: usize,
    pub speech_rate: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis_delay_ms: DEFAULT_ANALYSIS_DELAY_MS,
            reminder_lead_ms: DEFAULT_REMINDER_LEAD_MS,
            max_image_bytes: MAX_IMAGE_BYTES,
            speech_rate: DEFAULT_SPEECH_RATE,
        }
    }
}

/// Lists fetched for the secondary screens. `loading` is set while the
/// store request for the active screen is outstanding.
#[derive(Debug, Clone, Default)]
pub struct ScreenData {
    pub loading: bool,
    /// Bumped every time a secondary screen is opened; list responses from
    /// an earlier visit are dropped.
    pub visit: u64,
    pub scans: Vec<ScanRecord>,
    pub reminders: Vec<ReminderRecord>,
    pub shopping: Vec<ShoppingItemRecord>,
    pub faqs: Vec<FaqEntry>,
    pub faq_category: Option<String>,
    pub chat: ChatTranscript,
}

impl ScreenData {
    /// Starts a new visit and returns its number.
    pub fn begin_visit(&mut self) -> u64 {
        self.visit += 1;
        self.loading = true;
        self.visit
    }

    pub fn clear_selection(&mut self) {
        self.loading = false;
        self.faq_category = None;
        self.chat.clear();
    }
}

pub struct Model {
    pub state: AppState,
    pub language: Language,
    pub tutorial_step: usize,
    pub config: AppConfig,
    pub engine: DiagnosisEngine,

    pub image: Option<CapturedImage>,
    pub diagnosis: Option<Diagnosis>,
    /// Bumped whenever the active image is replaced or discarded. Suspended
    /// work started under an older value is dropped when it resolves.
    pub generation: u64,
    /// Generation of the classification currently waiting to run.
    pub in_flight: Option<u64>,
    /// Store id of the scan behind the current result, once known.
    pub current_scan_id: Option<RecordId>,

    pub screen: ScreenData,
    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
    pub now_ms: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            state: AppState::Welcome,
            language: Language::default(),
            tutorial_step: 0,
            config: AppConfig::default(),
            engine: DiagnosisEngine::default(),
            image: None,
            diagnosis: None,
            generation: 0,
            in_flight: None,
            current_scan_id: None,
            screen: ScreenData::default(),
            active_error: None,
            active_toast: None,
            now_ms: get_current_time_ms(),
        }
    }
}

impl Model {
    #[must_use]
    pub fn with_engine(engine: DiagnosisEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn update_timestamp(&mut self) {
        self.now_ms = get_current_time_ms();
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn has_result(&self) -> bool {
        self.image.is_some() && self.diagnosis.is_some()
    }

    /// Starts a new capture cycle and returns its generation.
    pub fn begin_capture(&mut self, image: CapturedImage) -> u64 {
        self.generation += 1;
        self.image = Some(image);
        self.diagnosis = None;
        self.current_scan_id = None;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Drops the image and diagnosis. Anything still suspended under the
    /// current generation becomes stale.
    pub fn discard_capture(&mut self) {
        self.generation += 1;
        self.image = None;
        self.diagnosis = None;
        self.current_scan_id = None;
        self.in_flight = None;
    }

    /// Shows a stored scan as the current result. Nothing is classified or
    /// persisted.
    pub fn rehydrate(&mut self, scan: &ScanRecord) {
        self.generation += 1;
        self.image = Some(CapturedImage::from_history(
            scan.image_url.clone(),
            scan.scanned_at_ms,
        ));
        self.diagnosis = Some(scan.diagnosis.clone());
        self.current_scan_id = Some(scan.id.clone());
        self.in_flight = None;
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.image.is_some()
    }

    /// Result is only valid with both halves present; otherwise fall back
    /// to Main.
    pub fn enforce_result_invariant(&mut self) -> bool {
        if self.state == AppState::Result && !self.has_result() {
            self.discard_capture();
            self.state = AppState::Main;
            return true;
        }
        false
    }
}
