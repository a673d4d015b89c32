use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, StoreError};
use crate::chat::best_match;
use crate::diagnosis::TreatmentKind;
use crate::event::Event;
use crate::i18n::{resolve, Language, TextKey};
use crate::model::{AppState, CapturedImage, Model, Screen};
use crate::records::{NewReminder, NewScanRecord, NewShoppingItem, RecordId};
use crate::view::ViewModel;
use crate::{AppError, ErrorKind, ToastKind, TUTORIAL_STEP_COUNT};

#[derive(Default)]
pub struct App;

impl App {
    fn toast(model: &mut Model, key: TextKey, kind: ToastKind) {
        let text = resolve(key, model.language);
        model.show_toast(text, kind);
    }

    /// Store failures are reported and otherwise ignored. They never move
    /// the state machine.
    fn persistence_failed(model: &mut Model, operation: &'static str, error: StoreError) {
        let retryable = error.is_retryable();
        let err = AppError::from(error).with_context("operation", operation);
        warn!(
            code = err.code(),
            operation,
            retryable,
            error = %err,
            "store request failed"
        );
        let text = err.user_facing_message(model.language);
        model.show_toast(text, ToastKind::Warning);
    }

    fn drop_stale(event: &'static str, state: AppState) {
        debug!(
            code = ErrorKind::StaleResult.code(),
            event,
            %state,
            "dropping stale response"
        );
    }

    fn capture(image: CapturedImage, model: &mut Model, caps: &Capabilities) {
        if let Some(generation) = model.in_flight {
            warn!(generation, "capture rejected, analysis already running");
            Self::toast(model, TextKey::AnalysisBusy, ToastKind::Warning);
            return;
        }
        if !model.state.can_capture() {
            debug!(state = %model.state, "capture ignored outside main");
            return;
        }

        model.clear_error();
        let generation = model.begin_capture(image);
        model.state = AppState::Processing;
        caps.delay
            .start(model.config.analysis_delay_ms, Event::AnalysisReady { generation });
    }

    fn analyze(generation: u64, model: &mut Model, caps: &Capabilities) {
        if model.state != AppState::Processing
            || model.in_flight != Some(generation)
            || !model.is_current(generation)
        {
            Self::drop_stale("analysis_ready", model.state);
            return;
        }
        model.in_flight = None;

        let Some(image) = model.image.as_ref() else {
            return;
        };
        match model.engine.classify(image) {
            Ok(diagnosis) => {
                info!(
                    generation,
                    disease = %diagnosis.disease(),
                    confidence = diagnosis.confidence_percent(),
                    "analysis complete"
                );
                let record = NewScanRecord {
                    image_url: image.display_url.clone(),
                    diagnosis: diagnosis.clone(),
                    scanned_at_ms: image.captured_at_ms,
                };
                model.diagnosis = Some(diagnosis);
                model.state = AppState::Result;
                Self::toast(model, TextKey::AnalysisComplete, ToastKind::Success);

                caps.store.create_scan(record, move |result| Event::ScanSaved {
                    generation,
                    result,
                });
            }
            Err(e) => {
                let err = AppError::from(e).with_context("generation", generation.to_string());
                warn!(code = err.code(), error = %err, "analysis failed");
                model.show_toast(err.user_facing_message(model.language), ToastKind::Error);
                model.set_error(err);
                model.discard_capture();
                model.state = AppState::Main;
            }
        }
    }

    fn add_to_shopping(kind: TreatmentKind, model: &Model, caps: &Capabilities) {
        if model.state != AppState::Result {
            return;
        }
        let Some(diagnosis) = model.diagnosis.as_ref() else {
            return;
        };
        let item = NewShoppingItem::named(diagnosis.suggestion(kind).name.clone(), kind.into());
        let generation = model.generation;
        caps.store.create_shopping_item(item, move |result| {
            Event::ShoppingItemCreated { generation, result }
        });
    }

    fn set_reminder(kind: TreatmentKind, model: &Model, caps: &Capabilities) {
        if model.state != AppState::Result {
            return;
        }
        let Some(diagnosis) = model.diagnosis.as_ref() else {
            return;
        };
        let reminder = NewReminder {
            treatment_name: diagnosis.suggestion(kind).name.clone(),
            due_at_ms: model.now_ms.saturating_add(model.config.reminder_lead_ms),
            scan_id: model.current_scan_id.clone(),
            notes: None,
        };
        let generation = model.generation;
        caps.store.create_reminder(reminder, move |result| Event::ReminderCreated {
            generation,
            result,
        });
    }

    fn open_screen(screen: Screen, model: &mut Model, caps: &Capabilities) {
        if model.state != AppState::Main {
            return;
        }
        model.state = screen.into();
        model.screen.clear_selection();
        let visit = model.screen.begin_visit();

        match screen {
            Screen::History => caps
                .store
                .list_scans(move |result| Event::ScansLoaded { visit, result }),
            Screen::Reminders => caps
                .store
                .list_reminders(move |result| Event::RemindersLoaded { visit, result }),
            Screen::Shopping => caps
                .store
                .list_shopping_items(move |result| Event::ShoppingLoaded { visit, result }),
            Screen::Chatbot => {
                model.screen.chat.greet(model.language, model.now_ms);
                caps.store
                    .list_active_faqs(move |result| Event::FaqsLoaded { visit, result });
            }
        }
    }

    fn select_scan(id: &RecordId, model: &mut Model) {
        if model.state != AppState::History {
            return;
        }
        let Some(scan) = model.screen.scans.iter().find(|s| &s.id == id).cloned() else {
            warn!(%id, "selected scan is not in the loaded history");
            return;
        };
        model.rehydrate(&scan);
        model.state = AppState::Result;
    }

    /// Applies a list response if it belongs to the current visit of its
    /// screen.
    fn screen_loaded<T>(
        model: &mut Model,
        screen: AppState,
        visit: u64,
        event: &'static str,
        result: Result<T, StoreError>,
        apply: impl FnOnce(&mut Model, T),
    ) {
        if model.state != screen || model.screen.visit != visit {
            Self::drop_stale(event, model.state);
            return;
        }
        model.screen.loading = false;
        match result {
            Ok(data) => apply(model, data),
            Err(e) => Self::persistence_failed(model, event, e),
        }
    }

    fn toggle_reminder(id: RecordId, model: &Model, caps: &Capabilities) {
        if model.state != AppState::Reminders {
            return;
        }
        let Some(reminder) = model.screen.reminders.iter().find(|r| r.id == id) else {
            return;
        };
        let completed = !reminder.is_completed;
        caps.store
            .set_reminder_completed(id.clone(), completed, move |result| {
                Event::ReminderUpdated {
                    id,
                    completed,
                    result,
                }
            });
    }

    fn toggle_purchased(id: RecordId, model: &Model, caps: &Capabilities) {
        if model.state != AppState::Shopping {
            return;
        }
        let Some(item) = model.screen.shopping.iter().find(|i| i.id == id) else {
            return;
        };
        let purchased = !item.is_purchased;
        caps.store
            .set_item_purchased(id.clone(), purchased, move |result| {
                Event::ShoppingItemUpdated {
                    id,
                    purchased,
                    result,
                }
            });
    }

    fn faq_selected(id: &RecordId, model: &mut Model) {
        if model.state != AppState::Chatbot {
            return;
        }
        let language = model.language;
        let Some(faq) = model.screen.faqs.iter().find(|f| &f.id == id) else {
            return;
        };
        let question = faq.question(language).to_string();
        let answer = faq.answer(language).to_string();
        model.screen.chat.push_user(question, model.now_ms);
        model.screen.chat.push_bot(answer, model.now_ms);
    }

    fn chat_question(text: &str, model: &mut Model) {
        if model.state != AppState::Chatbot {
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let reply = match best_match(text, &model.screen.faqs) {
            Some(faq) => faq.answer(model.language).to_string(),
            None => resolve(TextKey::ComingSoon, model.language).to_string(),
        };
        model.screen.chat.push_user(text, model.now_ms);
        model.screen.chat.push_bot(reply, model.now_ms);
    }

    fn select_language(language: Language, model: &mut Model) {
        model.language = language;
        if model.state == AppState::Welcome {
            model.tutorial_step = 0;
            model.state = AppState::Tutorial;
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        model.update_timestamp();
        if model
            .active_toast
            .as_ref()
            .is_some_and(|t| t.is_expired(model.now_ms))
        {
            model.clear_toast();
        }

        let event_name = event.name();
        let before = model.state;
        debug!(
            event = event_name,
            user = event.is_user_initiated(),
            state = %before,
            "dispatch"
        );

        match event {
            Event::Noop => {}

            Event::LanguageSelected(language) => Self::select_language(language, model),

            Event::TutorialAdvanced => {
                if model.state == AppState::Tutorial {
                    model.tutorial_step += 1;
                    if model.tutorial_step >= TUTORIAL_STEP_COUNT {
                        model.state = AppState::Main;
                    }
                }
            }

            Event::TutorialSkipped => {
                if model.state == AppState::Tutorial {
                    model.state = AppState::Main;
                }
            }

            Event::ImageCaptured(image) => Self::capture(*image, model, caps),

            Event::AnalysisReady { generation } => Self::analyze(generation, model, caps),

            Event::CancelProcessing => {
                if model.state == AppState::Processing {
                    model.discard_capture();
                    model.state = AppState::Main;
                }
            }

            Event::RetakeRequested => {
                if matches!(model.state, AppState::Result | AppState::Processing) {
                    caps.speech.stop();
                    model.discard_capture();
                    model.state = AppState::Main;
                }
            }

            Event::AddToShoppingRequested { kind } => Self::add_to_shopping(kind, model, caps),

            Event::SetReminderRequested { kind } => Self::set_reminder(kind, model, caps),

            Event::SpeakRequested { text } => {
                if !text.trim().is_empty() {
                    caps.speech.speak(
                        text,
                        model.language.speech_locale(),
                        model.config.speech_rate,
                    );
                }
            }

            Event::NavigateTo(screen) => Self::open_screen(screen, model, caps),

            Event::BackRequested => {
                if model.state.is_secondary() {
                    model.screen.clear_selection();
                    model.state = AppState::Main;
                }
            }

            Event::ScanSelected { id } => Self::select_scan(&id, model),

            Event::ScanSaved { generation, result } => {
                if model.is_current(generation) {
                    match result {
                        Ok(id) => {
                            debug!(%id, generation, "scan saved");
                            model.current_scan_id = Some(id);
                        }
                        Err(e) => Self::persistence_failed(model, event_name, e),
                    }
                } else {
                    Self::drop_stale(event_name, model.state);
                }
            }

            Event::ReminderCreated { generation, result } => {
                if model.is_current(generation) {
                    match result {
                        Ok(id) => {
                            debug!(%id, generation, "reminder created");
                            Self::toast(model, TextKey::ReminderSet, ToastKind::Success);
                        }
                        Err(e) => Self::persistence_failed(model, event_name, e),
                    }
                } else {
                    Self::drop_stale(event_name, model.state);
                }
            }

            Event::ShoppingItemCreated { generation, result } => {
                if model.is_current(generation) {
                    match result {
                        Ok(id) => {
                            debug!(%id, generation, "shopping item created");
                            Self::toast(model, TextKey::AddedToShopping, ToastKind::Success);
                        }
                        Err(e) => Self::persistence_failed(model, event_name, e),
                    }
                } else {
                    Self::drop_stale(event_name, model.state);
                }
            }

            Event::ScansLoaded { visit, result } => Self::screen_loaded(
                model,
                AppState::History,
                visit,
                event_name,
                result,
                |m, scans| m.screen.scans = scans,
            ),

            Event::RemindersLoaded { visit, result } => Self::screen_loaded(
                model,
                AppState::Reminders,
                visit,
                event_name,
                result,
                |m, reminders| m.screen.reminders = reminders,
            ),

            Event::ShoppingLoaded { visit, result } => Self::screen_loaded(
                model,
                AppState::Shopping,
                visit,
                event_name,
                result,
                |m, items| m.screen.shopping = items,
            ),

            Event::FaqsLoaded { visit, result } => Self::screen_loaded(
                model,
                AppState::Chatbot,
                visit,
                event_name,
                result,
                |m, faqs| m.screen.faqs = faqs,
            ),

            Event::ToggleReminderCompleted { id } => Self::toggle_reminder(id, model, caps),

            Event::ReminderUpdated {
                id,
                completed,
                result,
            } => match result {
                Ok(()) => {
                    if let Some(r) = model.screen.reminders.iter_mut().find(|r| r.id == id) {
                        r.is_completed = completed;
                    }
                    let key = if completed {
                        TextKey::ReminderCompleted
                    } else {
                        TextKey::ReminderReset
                    };
                    Self::toast(model, key, ToastKind::Success);
                }
                Err(e) => Self::persistence_failed(model, event_name, e),
            },

            Event::DeleteReminder { id } => {
                if model.state == AppState::Reminders {
                    caps.store.delete_reminder(id.clone(), move |result| {
                        Event::ReminderDeleted { id, result }
                    });
                }
            }

            Event::ReminderDeleted { id, result } => match result {
                Ok(()) => {
                    model.screen.reminders.retain(|r| r.id != id);
                    Self::toast(model, TextKey::ReminderDeleted, ToastKind::Success);
                }
                Err(e) => Self::persistence_failed(model, event_name, e),
            },

            Event::TogglePurchased { id } => Self::toggle_purchased(id, model, caps),

            Event::ShoppingItemUpdated {
                id,
                purchased,
                result,
            } => match result {
                Ok(()) => {
                    if let Some(item) = model.screen.shopping.iter_mut().find(|i| i.id == id) {
                        item.is_purchased = purchased;
                    }
                    let key = if purchased {
                        TextKey::ItemPurchased
                    } else {
                        TextKey::ItemPending
                    };
                    Self::toast(model, key, ToastKind::Success);
                }
                Err(e) => Self::persistence_failed(model, event_name, e),
            },

            Event::DeleteShoppingItem { id } => {
                if model.state == AppState::Shopping {
                    caps.store.delete_shopping_item(id.clone(), move |result| {
                        Event::ShoppingItemDeleted { id, result }
                    });
                }
            }

            Event::ShoppingItemDeleted { id, result } => match result {
                Ok(()) => {
                    model.screen.shopping.retain(|i| i.id != id);
                    Self::toast(model, TextKey::ItemDeleted, ToastKind::Success);
                }
                Err(e) => Self::persistence_failed(model, event_name, e),
            },

            Event::FaqCategorySelected(category) => {
                if model.state == AppState::Chatbot {
                    model.screen.faq_category = category;
                }
            }

            Event::FaqSelected { id } => Self::faq_selected(&id, model),

            Event::ChatQuestionSubmitted { text } => Self::chat_question(&text, model),

            Event::ConfigUpdated(config) => {
                model.engine.set_max_image_bytes(config.max_image_bytes);
                model.config = *config;
                debug!(config = ?model.config, "config updated");
            }

            Event::DismissNotice => {
                model.clear_toast();
                model.clear_error();
            }
        }

        if model.enforce_result_invariant() {
            warn!(
                code = ErrorKind::InvalidState.code(),
                "result without image or diagnosis, back to main"
            );
        }
        if model.state != before {
            info!(from = %before, to = %model.state, event = event_name, "state transition");
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        crate::view::build(model)
    }
}
