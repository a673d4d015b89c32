//! Bilingual string lookup.
//!
//! Every display string the core hands to a shell goes through [`resolve`].
//! Keys arriving from outside the core as plain strings go through
//! [`resolve_key`], which fails closed by echoing the key back.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use crate::diagnosis::DiseaseCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Telugu,
    English,
}

impl Language {
    /// BCP-47 tag handed to the speech engine.
    #[must_use]
    pub const fn speech_locale(self) -> &'static str {
        match self {
            Self::Telugu => "te-IN",
            Self::English => "en-IN",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telugu => "telugu",
            Self::English => "english",
        }
    }
}

macro_rules! text_keys {
    ($($variant:ident => $key:literal, $te:literal, $en:literal;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum TextKey {
            $($variant,)+
        }

        impl TextKey {
            pub const ALL: &'static [TextKey] = &[$(TextKey::$variant,)+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(TextKey::$variant => $key,)+
                }
            }

            #[must_use]
            pub fn parse(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(TextKey::$variant),)+
                    _ => None,
                }
            }
        }

        #[must_use]
        pub const fn resolve(key: TextKey, language: Language) -> &'static str {
            match (key, language) {
                $(
                    (TextKey::$variant, Language::Telugu) => $te,
                    (TextKey::$variant, Language::English) => $en,
                )+
            }
        }
    };
}

text_keys! {
    Welcome => "welcome", "స్వాగతం — AgriVaani వ్యవసాయ సలహాదారు", "Welcome — AgriVaani Crop Doctor";
    LanguageChoice => "languageChoice", "భాష ఎంచుకోండి", "Choose Language";
    TutorialStep1 => "tutorialStep1", "1) ఫోటో తీసుకోండి", "1) Take a photo";
    TutorialStep1Detail => "tutorialStep1Detail", "మీ పంట ఆకు లేదా కాడ యొక్క స్పష్టమైన ఫోటో తీయండి", "Take a clear photo of your crop leaf or stem";
    TutorialStep2 => "tutorialStep2", "2) ఫలితాలు వినండి", "2) Listen to results";
    TutorialStep2Detail => "tutorialStep2Detail", "రోగ నిర్ధారణ మరియు చికిత్స సూచనలను వినండి", "Listen to disease diagnosis and treatment suggestions";
    CapturePhoto => "capturePhoto", "ఫోటో తీసుకోండి", "Capture Photo";
    Analyzing => "analyzing", "పరిశీలిస్తున్నాం… కింది విధంగా వేచి ఉండండి", "Analyzing… please wait a moment";
    Diagnosis => "diagnosis", "రోగ నిర్ధారణ", "Diagnosis";
    Organic => "organic", "సేంద్రీయ", "Organic";
    Chemical => "chemical", "రసాయన", "Chemical";
    Listen => "listen", "ఆవాజు వినండి", "Listen";
    Causes => "causes", "సాధ్య కారణాలు:", "Likely causes:";
    AskQuestion => "askQuestion", "ప్రశ్న అడగండి — నేను సహాయం చేస్తాను", "Ask a question — I'll help";
    Skip => "skip", "దాటవేయండి", "Skip";
    Next => "next", "తర్వాత", "Next";
    GetStarted => "getStarted", "మొదలుపెట్టండి", "Get Started";
    Gallery => "gallery", "గ్యాలరీ", "Gallery";
    Camera => "camera", "కేమెరా", "Camera";
    Retake => "retake", "మళ్లీ తీయండి", "Retake";
    Analyze => "analyze", "విశ్లేషించండి", "Analyze";
    ScanHistory => "scanHistory", "స్కాన్ చరిత్ర", "Scan History";
    Reminders => "reminders", "చికిత్స రిమైండర్లు", "Treatment Reminders";
    ShoppingList => "shoppingList", "షాపింగ్ జాబితా", "Shopping List";
    Chatbot => "chatbot", "సహాయం మరియు FAQ", "Help & FAQ";
    AddToShopping => "addToShopping", "షాపింగ్ లిస్ట్‌కి జోడించు", "Add to Shopping";
    SetReminder => "setReminder", "రిమైండర్ సెట్ చేయండి", "Set Reminder";
    ViewHistory => "viewHistory", "చరిత్రను చూడండి", "View History";
    Suppliers => "suppliers", "సప్లైయర్లు", "Suppliers";
    Purchased => "purchased", "కొనుగోలు చేసారు", "Purchased";
    Pending => "pending", "పెండింగ్", "Pending";
    Completed => "completed", "పూర్తయింది", "Completed";
    Settings => "settings", "సెట్టింగ్లు", "Settings";
    Confidence => "confidence", "నమ్మకం", "Confidence";
    Overdue => "overdue", "గడిచిపోయింది", "Overdue";
    Loading => "loading", "లోడ్ అవుతోంది...", "Loading...";
    AnalysisComplete => "analysisComplete", "విశ్లేషణ పూర్తయింది!", "Analysis Complete!";
    ChatGreeting => "chatGreeting", "నమస్కారం! నేను AgriVaani సహాయకుడిని. మీకు ఏమైనా ప్రశ్నలు ఉంటే అడగండి.", "Hello! I'm AgriVaani assistant. Ask me any questions about crop diseases and treatments.";
    ComingSoon => "comingSoon", "కస్టమ్ ప్రశ్నలు త్వరలో సపోర్ట్ చేస్తాము", "Custom questions will be supported soon";
    NoHistory => "noHistory", "ఇంకా స్కాన్లు లేవు. మీ మొదటి స్కాన్ తీసుకోండి!", "No scans yet. Take your first scan!";
    NoReminders => "noReminders", "రిమైండర్లు లేవు", "No Reminders";
    ShoppingEmpty => "shoppingEmpty", "షాపింగ్ జాబితా ఖాళీ", "Shopping List Empty";
    NoFaqsInCategory => "noFaqsInCategory", "ఈ వర్గంలో ప్రశ్నలు లేవు", "No questions in this category";
    AddedToShopping => "addedToShopping", "షాపింగ్ జాబితాకు జోడించబడింది", "Added to shopping list";
    ReminderSet => "reminderSet", "రిమైండర్ సెట్ చేయబడింది", "Reminder set";
    ReminderCompleted => "reminderCompleted", "రిమైండర్ పూర్తయింది", "Reminder completed";
    ReminderReset => "reminderReset", "రిమైండర్ రీసెట్ చేయబడింది", "Reminder reset";
    ReminderDeleted => "reminderDeleted", "రిమైండర్ తొలగించబడింది", "Reminder deleted";
    ItemPurchased => "itemPurchased", "వస్తువు కొనుగోలు చేయబడింది", "Item purchased";
    ItemPending => "itemPending", "వస్తువు పెండింగ్‌లోకి మార్చబడింది", "Item moved to pending";
    ItemDeleted => "itemDeleted", "వస్తువు తొలగించబడింది", "Item deleted";
    AnalysisBusy => "analysisBusy", "విశ్లేషణ జరుగుతోంది, దయచేసి వేచి ఉండండి", "An analysis is already running, please wait";
    DiseaseRust => "diseaseRust", "తుప్పు", "Rust";
    DiseaseBlight => "diseaseBlight", "బ్లైట్", "Blight";
    DiseaseMildew => "diseaseMildew", "మిల్డ్యూ", "Mildew";
    DiseaseUnknown => "diseaseUnknown", "తెలియని రోగం", "Unknown Disease";
}

/// Resolves a key that arrived as a plain string. Unknown keys resolve to
/// themselves.
#[must_use]
pub fn resolve_key(key: &str, language: Language) -> Cow<'_, str> {
    match TextKey::parse(key) {
        Some(k) => Cow::Borrowed(resolve(k, language)),
        None => {
            debug!(key, code = crate::ErrorKind::LookupMiss.code(), "translation miss");
            Cow::Borrowed(key)
        }
    }
}

#[must_use]
pub const fn disease_key(category: DiseaseCategory) -> TextKey {
    match category {
        DiseaseCategory::Rust => TextKey::DiseaseRust,
        DiseaseCategory::Blight => TextKey::DiseaseBlight,
        DiseaseCategory::Mildew => TextKey::DiseaseMildew,
        DiseaseCategory::Unknown => TextKey::DiseaseUnknown,
    }
}

#[must_use]
pub const fn disease_name(category: DiseaseCategory, language: Language) -> &'static str {
    resolve(disease_key(category), language)
}
