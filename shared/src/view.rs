//! Render contract handed to the shells. Everything here is display-ready:
//! strings are already localized and lists are already ordered.

use serde::{Deserialize, Serialize};

use crate::chat::{categories, faqs_in_category, ChatMessage};
use crate::diagnosis::{Diagnosis, Treatment};
use crate::i18n::{disease_name, resolve, Language, TextKey};
use crate::model::{AppState, CapturedImage, Model};
use crate::records::{ItemType, ReminderRecord, ScanRecord, ShoppingItemRecord};
use crate::{format_time_remaining, ToastKind, HISTORY_CAUSE_PREVIEW, TUTORIAL_STEP_COUNT};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub language: Language,
    pub screen: ScreenView,
    pub toast: Option<ToastView>,
    pub error: Option<ErrorView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
    pub is_retryable: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Welcome {
        title: String,
        language_prompt: String,
    },
    Tutorial {
        /// 1-based.
        step: usize,
        total: usize,
        title: String,
        detail: String,
        is_last: bool,
    },
    Main {
        can_capture: bool,
    },
    Processing {
        message: String,
        image_url: String,
    },
    Result(ResultView),
    History {
        loading: bool,
        scans: Vec<ScanSummary>,
        empty_message: Option<String>,
    },
    Reminders {
        loading: bool,
        pending: Vec<ReminderView>,
        completed: Vec<ReminderView>,
        empty_message: Option<String>,
    },
    Shopping {
        loading: bool,
        pending: Vec<ShoppingItemView>,
        purchased: Vec<ShoppingItemView>,
        empty_message: Option<String>,
    },
    Chatbot(ChatView),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreatmentView {
    pub name: String,
    pub how_to_use: String,
    pub safety_note: String,
}

impl From<&Treatment> for TreatmentView {
    fn from(t: &Treatment) -> Self {
        Self {
            name: t.name.clone(),
            how_to_use: t.how_to_use.clone(),
            safety_note: t.safety_note.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultView {
    pub image_url: String,
    pub disease_id: String,
    pub disease_name: String,
    pub confidence_percent: u8,
    pub organic: TreatmentView,
    pub chemical: TreatmentView,
    pub causes: Vec<String>,
    /// Text for the listen button: disease name followed by the treatments.
    pub speech_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub id: String,
    pub image_url: String,
    pub disease_name: String,
    pub confidence_percent: u8,
    pub scanned_at_ms: u64,
    pub causes_preview: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderView {
    pub id: String,
    pub treatment_name: String,
    pub due_at_ms: u64,
    pub due_label: String,
    pub is_completed: bool,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShoppingItemView {
    pub id: String,
    pub item_name: String,
    pub item_type: ItemType,
    pub is_purchased: bool,
    pub quantity: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub estimated_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaqView {
    pub id: String,
    pub category: String,
    pub question: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatView {
    pub loading: bool,
    pub categories: Vec<String>,
    pub selected_category: Option<String>,
    pub faqs: Vec<FaqView>,
    pub empty_message: Option<String>,
    pub messages: Vec<ChatMessage>,
}

pub(crate) fn build(model: &Model) -> ViewModel {
    let language = model.language;
    ViewModel {
        language,
        screen: screen_view(model),
        toast: model
            .active_toast
            .as_ref()
            .filter(|t| !t.is_expired(model.now_ms))
            .map(|t| ToastView {
                message: t.message.clone(),
                kind: t.kind,
                duration_ms: t.duration_ms,
            }),
        error: model.active_error.as_ref().map(|e| ErrorView {
            code: e.code().to_string(),
            message: e.user_facing_message(language),
            is_retryable: e.is_user_retryable(),
        }),
    }
}

fn screen_view(model: &Model) -> ScreenView {
    let language = model.language;
    match model.state {
        AppState::Welcome => ScreenView::Welcome {
            title: resolve(TextKey::Welcome, language).to_string(),
            language_prompt: resolve(TextKey::LanguageChoice, language).to_string(),
        },
        AppState::Tutorial => tutorial_view(model.tutorial_step, language),
        AppState::Main => main_view(model),
        AppState::Processing => ScreenView::Processing {
            message: resolve(TextKey::Analyzing, language).to_string(),
            image_url: model
                .image
                .as_ref()
                .map(|i| i.display_url.clone())
                .unwrap_or_default(),
        },
        AppState::Result => match (model.image.as_ref(), model.diagnosis.as_ref()) {
            (Some(image), Some(diagnosis)) => {
                ScreenView::Result(result_view(image, diagnosis, language))
            }
            _ => main_view(model),
        },
        AppState::History => {
            let scans: Vec<_> = model
                .screen
                .scans
                .iter()
                .map(|s| scan_summary(s, language))
                .collect();
            ScreenView::History {
                loading: model.screen.loading,
                empty_message: empty_message(
                    model.screen.loading,
                    scans.is_empty(),
                    TextKey::NoHistory,
                    language,
                ),
                scans,
            }
        }
        AppState::Reminders => {
            let (completed, pending): (Vec<_>, Vec<_>) = model
                .screen
                .reminders
                .iter()
                .map(|r| reminder_view(r, model.now_ms, language))
                .partition(|r| r.is_completed);
            let empty = pending.is_empty() && completed.is_empty();
            ScreenView::Reminders {
                loading: model.screen.loading,
                empty_message: empty_message(
                    model.screen.loading,
                    empty,
                    TextKey::NoReminders,
                    language,
                ),
                pending,
                completed,
            }
        }
        AppState::Shopping => {
            let (purchased, pending): (Vec<_>, Vec<_>) = model
                .screen
                .shopping
                .iter()
                .map(shopping_view)
                .partition(|i| i.is_purchased);
            let empty = pending.is_empty() && purchased.is_empty();
            ScreenView::Shopping {
                loading: model.screen.loading,
                empty_message: empty_message(
                    model.screen.loading,
                    empty,
                    TextKey::ShoppingEmpty,
                    language,
                ),
                pending,
                purchased,
            }
        }
        AppState::Chatbot => ScreenView::Chatbot(chat_view(model)),
    }
}

fn empty_message(loading: bool, empty: bool, key: TextKey, language: Language) -> Option<String> {
    (!loading && empty).then(|| resolve(key, language).to_string())
}

fn tutorial_view(step: usize, language: Language) -> ScreenView {
    let index = step.min(TUTORIAL_STEP_COUNT - 1);
    let (title, detail) = if index == 0 {
        (TextKey::TutorialStep1, TextKey::TutorialStep1Detail)
    } else {
        (TextKey::TutorialStep2, TextKey::TutorialStep2Detail)
    };
    ScreenView::Tutorial {
        step: index + 1,
        total: TUTORIAL_STEP_COUNT,
        title: resolve(title, language).to_string(),
        detail: resolve(detail, language).to_string(),
        is_last: index + 1 == TUTORIAL_STEP_COUNT,
    }
}

fn main_view(model: &Model) -> ScreenView {
    ScreenView::Main {
        can_capture: model.state.can_capture() && !model.is_processing(),
    }
}

fn result_view(image: &CapturedImage, diagnosis: &Diagnosis, language: Language) -> ResultView {
    let name = disease_name(diagnosis.disease(), language);
    let organic = diagnosis.organic_suggestion();
    let chemical = diagnosis.chemical_suggestion();
    let speech_text = format!(
        "{name}. {}: {}. {}: {}.",
        resolve(TextKey::Organic, language),
        organic.name,
        resolve(TextKey::Chemical, language),
        chemical.name,
    );
    ResultView {
        image_url: image.display_url.clone(),
        disease_id: diagnosis.disease().id().to_string(),
        disease_name: name.to_string(),
        confidence_percent: diagnosis.confidence_percent(),
        organic: organic.into(),
        chemical: chemical.into(),
        causes: diagnosis.causes().to_vec(),
        speech_text,
    }
}

fn scan_summary(scan: &ScanRecord, language: Language) -> ScanSummary {
    ScanSummary {
        id: scan.id.to_string(),
        image_url: scan.image_url.clone(),
        disease_name: disease_name(scan.diagnosis.disease(), language).to_string(),
        confidence_percent: scan.diagnosis.confidence_percent(),
        scanned_at_ms: scan.scanned_at_ms,
        causes_preview: scan
            .diagnosis
            .causes()
            .iter()
            .take(HISTORY_CAUSE_PREVIEW)
            .cloned()
            .collect(),
    }
}

fn reminder_view(reminder: &ReminderRecord, now_ms: u64, language: Language) -> ReminderView {
    ReminderView {
        id: reminder.id.to_string(),
        treatment_name: reminder.treatment_name.clone(),
        due_at_ms: reminder.due_at_ms,
        due_label: format_time_remaining(reminder.due_at_ms, now_ms, language),
        is_completed: reminder.is_completed,
        notes: reminder.notes.clone(),
    }
}

fn shopping_view(item: &ShoppingItemRecord) -> ShoppingItemView {
    ShoppingItemView {
        id: item.id.to_string(),
        item_name: item.item_name.clone(),
        item_type: item.item_type,
        is_purchased: item.is_purchased,
        quantity: item.quantity.clone(),
        supplier_name: item.supplier_name.clone(),
        supplier_contact: item.supplier_contact.clone(),
        estimated_price: item.estimated_price,
        notes: item.notes.clone(),
    }
}

fn chat_view(model: &Model) -> ChatView {
    let language = model.language;
    let selected = model.screen.faq_category.as_deref();
    let faqs: Vec<_> = faqs_in_category(&model.screen.faqs, selected)
        .map(|f| FaqView {
            id: f.id.to_string(),
            category: f.category.clone(),
            question: f.question(language).to_string(),
        })
        .collect();
    ChatView {
        loading: model.screen.loading,
        categories: categories(&model.screen.faqs),
        selected_category: model.screen.faq_category.clone(),
        empty_message: empty_message(
            model.screen.loading,
            faqs.is_empty(),
            TextKey::NoFaqsInCategory,
            language,
        ),
        faqs,
        messages: model.screen.chat.messages().to_vec(),
    }
}
