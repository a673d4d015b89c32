use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use pretty_assertions::assert_eq;

use shared::capabilities::{StoreError, StoreOperation, StoreOutput};
use shared::diagnosis::diagnosis_for;
use shared::model::Screen;
use shared::{
    App, AppState, DiseaseCategory, Effect, Event, FaqEntry, ItemType, Language, Model, RecordId,
    ReminderRecord, ScanRecord, ScreenView, ShoppingItemRecord, ToastKind, MS_PER_HOUR,
};

fn settle(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    update: Update<Effect, Event>,
) -> Vec<Effect> {
    let mut effects = update.effects;
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

fn store_request(effects: Vec<Effect>) -> Option<Request<StoreOperation>> {
    effects.into_iter().find_map(|e| match e {
        Effect::Store(request) => Some(request),
        _ => None,
    })
}

fn main_model(app: &AppTester<App, Effect>) -> Model {
    let mut model = Model::default();
    app.update(Event::LanguageSelected(Language::English), &mut model);
    app.update(Event::TutorialSkipped, &mut model);
    model
}

/// Opens `screen` and answers its list request with `output`.
fn open(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    screen: Screen,
    output: Result<StoreOutput, StoreError>,
) {
    let update = app.update(Event::NavigateTo(screen), model);
    assert_eq!(model.state, AppState::from(screen));
    assert!(model.screen.loading);
    let mut list = store_request(update.effects).expect("list requested");
    let update = app.resolve(&mut list, output).expect("store resolves");
    settle(app, model, update);
}

fn scan(id: &str, category: DiseaseCategory, scanned_at_ms: u64) -> ScanRecord {
    ScanRecord {
        id: RecordId::new(id),
        image_url: format!("https://cdn.example/{id}.jpg"),
        diagnosis: diagnosis_for(category),
        scanned_at_ms,
        created_at_ms: scanned_at_ms,
    }
}

fn reminder(id: &str, due_at_ms: u64) -> ReminderRecord {
    ReminderRecord {
        id: RecordId::new(id),
        treatment_name: "Baking Soda Spray".into(),
        due_at_ms,
        is_completed: false,
        scan_id: None,
        notes: None,
        created_at_ms: 0,
    }
}

fn item(id: &str, name: &str) -> ShoppingItemRecord {
    ShoppingItemRecord {
        id: RecordId::new(id),
        item_name: name.into(),
        item_type: ItemType::Organic,
        is_purchased: false,
        quantity: Some("1 kg".into()),
        supplier_name: None,
        supplier_contact: None,
        estimated_price: Some(120.0),
        notes: None,
        created_at_ms: 0,
    }
}

fn faq(id: &str, category: &str, question_en: &str, answer_en: &str) -> FaqEntry {
    FaqEntry {
        id: RecordId::new(id),
        question_te: format!("{id} ప్రశ్న"),
        question_en: question_en.into(),
        answer_te: format!("{id} జవాబు"),
        answer_en: answer_en.into(),
        category: category.into(),
        is_active: true,
    }
}

#[test]
fn history_scan_rehydrates_result_without_persisting() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(
        &app,
        &mut model,
        Screen::History,
        Ok(StoreOutput::Scans(vec![
            scan("old", DiseaseCategory::Rust, 1_000),
            scan("new", DiseaseCategory::Mildew, 2_000),
        ])),
    );
    assert!(!model.screen.loading);
    let ScreenView::History { scans, .. } = app.view(&model).screen else {
        panic!("unexpected variant");
    };
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].id, "new");
    assert_eq!(scans[0].causes_preview.len(), 2);

    let update = app.update(
        Event::ScanSelected {
            id: RecordId::new("old"),
        },
        &mut model,
    );
    assert!(store_request(update.effects).is_none());
    assert_eq!(model.state, AppState::Result);
    assert_eq!(model.current_scan_id, Some(RecordId::new("old")));
    assert_eq!(
        model.diagnosis.as_ref().map(|d| d.disease()),
        Some(DiseaseCategory::Rust)
    );
    let ScreenView::Result(result) = app.view(&model).screen else {
        panic!("unexpected variant");
    };
    assert_eq!(result.image_url, "https://cdn.example/old.jpg");
    assert_eq!(result.confidence_percent, 85);

    app.update(Event::RetakeRequested, &mut model);
    assert_eq!(model.state, AppState::Main);
    assert!(!model.has_result());
}

#[test]
fn list_response_after_leaving_screen_is_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    let update = app.update(Event::NavigateTo(Screen::History), &mut model);
    let mut list = store_request(update.effects).expect("list requested");
    app.update(Event::BackRequested, &mut model);
    assert_eq!(model.state, AppState::Main);

    let update = app
        .resolve(
            &mut list,
            Ok(StoreOutput::Scans(vec![scan("a", DiseaseCategory::Blight, 1)])),
        )
        .expect("store resolves");
    settle(&app, &mut model, update);
    assert_eq!(model.state, AppState::Main);
    assert!(model.screen.scans.is_empty());
}

#[test]
fn reopened_screen_ignores_the_previous_visits_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    let update = app.update(Event::NavigateTo(Screen::History), &mut model);
    let mut first = store_request(update.effects).expect("first list requested");
    app.update(Event::BackRequested, &mut model);
    let update = app.update(Event::NavigateTo(Screen::History), &mut model);
    let mut second = store_request(update.effects).expect("second list requested");

    let update = app
        .resolve(
            &mut first,
            Ok(StoreOutput::Scans(vec![scan("stale", DiseaseCategory::Rust, 1)])),
        )
        .expect("store resolves");
    settle(&app, &mut model, update);
    assert_eq!(model.state, AppState::History);
    assert!(model.screen.loading);
    assert!(model.screen.scans.is_empty());

    let update = app
        .resolve(
            &mut second,
            Ok(StoreOutput::Scans(vec![scan("fresh", DiseaseCategory::Blight, 2)])),
        )
        .expect("store resolves");
    settle(&app, &mut model, update);
    assert!(!model.screen.loading);
    assert_eq!(model.screen.scans.len(), 1);
    assert_eq!(model.screen.scans[0].id, RecordId::new("fresh"));
}

#[test]
fn failed_list_load_is_a_soft_notice() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(&app, &mut model, Screen::Shopping, Err(StoreError::Unauthorized));
    assert_eq!(model.state, AppState::Shopping);
    assert!(!model.screen.loading);
    assert_eq!(
        model.active_toast.as_ref().map(|t| t.kind),
        Some(ToastKind::Warning)
    );
    assert!(matches!(
        app.view(&model).screen,
        ScreenView::Shopping { empty_message: Some(_), .. }
    ));
}

#[test]
fn toggling_a_reminder_twice_restores_it() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);
    let due = model.now_ms + 5 * MS_PER_HOUR;

    open(
        &app,
        &mut model,
        Screen::Reminders,
        Ok(StoreOutput::Reminders(vec![reminder("r1", due)])),
    );
    let original = model.screen.reminders.clone();

    for expected in [true, false] {
        let update = app.update(
            Event::ToggleReminderCompleted {
                id: RecordId::new("r1"),
            },
            &mut model,
        );
        let mut set = store_request(update.effects).expect("update requested");
        assert_eq!(
            set.operation,
            StoreOperation::SetReminderCompleted {
                id: RecordId::new("r1"),
                completed: expected,
            }
        );
        let update = app
            .resolve(&mut set, Ok(StoreOutput::Done))
            .expect("store resolves");
        settle(&app, &mut model, update);
        assert_eq!(model.screen.reminders[0].is_completed, expected);

        let ScreenView::Reminders { pending, completed, .. } = app.view(&model).screen else {
            panic!("unexpected variant");
        };
        assert_eq!(completed.len(), usize::from(expected));
        assert_eq!(pending.len(), usize::from(!expected));
    }

    assert_eq!(model.screen.reminders, original);
}

#[test]
fn failed_toggle_leaves_reminder_untouched() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(
        &app,
        &mut model,
        Screen::Reminders,
        Ok(StoreOutput::Reminders(vec![reminder("r1", 0)])),
    );
    let update = app.update(
        Event::ToggleReminderCompleted {
            id: RecordId::new("r1"),
        },
        &mut model,
    );
    let mut set = store_request(update.effects).expect("update requested");
    let update = app
        .resolve(
            &mut set,
            Err(StoreError::Network {
                message: "timeout".into(),
            }),
        )
        .expect("store resolves");
    settle(&app, &mut model, update);

    assert!(!model.screen.reminders[0].is_completed);
    assert_eq!(model.state, AppState::Reminders);
    let ScreenView::Reminders { pending, .. } = app.view(&model).screen else {
        panic!("unexpected variant");
    };
    assert_eq!(pending[0].due_label, "Overdue");
}

#[test]
fn shopping_items_toggle_and_delete_after_confirmation() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(
        &app,
        &mut model,
        Screen::Shopping,
        Ok(StoreOutput::ShoppingItems(vec![
            item("s1", "Neem Oil Spray"),
            item("s2", "Sulphur Dust"),
        ])),
    );

    let update = app.update(
        Event::TogglePurchased {
            id: RecordId::new("s1"),
        },
        &mut model,
    );
    let mut set = store_request(update.effects).expect("update requested");
    let update = app
        .resolve(&mut set, Ok(StoreOutput::Done))
        .expect("store resolves");
    settle(&app, &mut model, update);
    let ScreenView::Shopping { pending, purchased, .. } = app.view(&model).screen else {
        panic!("unexpected variant");
    };
    assert_eq!(purchased.len(), 1);
    assert_eq!(purchased[0].item_name, "Neem Oil Spray");
    assert_eq!(pending.len(), 1);

    let update = app.update(
        Event::DeleteShoppingItem {
            id: RecordId::new("s2"),
        },
        &mut model,
    );
    assert_eq!(model.screen.shopping.len(), 2);
    let mut delete = store_request(update.effects).expect("delete requested");
    let update = app
        .resolve(&mut delete, Ok(StoreOutput::Done))
        .expect("store resolves");
    settle(&app, &mut model, update);
    assert_eq!(model.screen.shopping.len(), 1);
    assert_eq!(
        model.active_toast.as_ref().map(|t| t.kind),
        Some(ToastKind::Success)
    );
}

#[test]
fn reminder_delete_is_applied_after_success() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(
        &app,
        &mut model,
        Screen::Reminders,
        Ok(StoreOutput::Reminders(vec![reminder("r1", 10), reminder("r2", 20)])),
    );
    let update = app.update(
        Event::DeleteReminder {
            id: RecordId::new("r1"),
        },
        &mut model,
    );
    let mut delete = store_request(update.effects).expect("delete requested");
    let update = app
        .resolve(&mut delete, Ok(StoreOutput::Done))
        .expect("store resolves");
    settle(&app, &mut model, update);

    let ids: Vec<_> = model
        .screen
        .reminders
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["r2"]);
}

#[test]
fn chat_answers_from_faqs_or_says_coming_soon() {
    let app = AppTester::<App, Effect>::default();
    let mut model = main_model(&app);

    open(
        &app,
        &mut model,
        Screen::Chatbot,
        Ok(StoreOutput::Faqs(vec![
            faq("f1", "treatment", "When should I spray neem oil?", "Spray in the evening."),
            faq("f2", "disease", "What causes leaf rust?", "Humid weather."),
        ])),
    );
    assert_eq!(model.screen.chat.len(), 1);
    assert_eq!(model.screen.faqs[0].category, "disease");

    app.update(
        Event::ChatQuestionSubmitted {
            text: "neem spray timing".into(),
        },
        &mut model,
    );
    let last = model.screen.chat.messages().last().expect("reply");
    assert!(!last.is_user);
    assert_eq!(last.text, "Spray in the evening.");

    app.update(
        Event::ChatQuestionSubmitted {
            text: "tractor subsidy".into(),
        },
        &mut model,
    );
    let last = model.screen.chat.messages().last().expect("reply");
    assert_eq!(last.text, "Custom questions will be supported soon");

    app.update(
        Event::FaqSelected {
            id: RecordId::new("f2"),
        },
        &mut model,
    );
    let messages = model.screen.chat.messages();
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[5].text, "What causes leaf rust?");
    assert!(messages[5].is_user);
    assert_eq!(messages[6].text, "Humid weather.");

    app.update(Event::FaqCategorySelected(Some("treatment".into())), &mut model);
    let ScreenView::Chatbot(chat) = app.view(&model).screen else {
        panic!("unexpected variant");
    };
    assert_eq!(chat.faqs.len(), 1);
    assert_eq!(chat.faqs[0].id, "f1");
    assert_eq!(chat.categories, ["disease", "treatment"]);

    app.update(Event::BackRequested, &mut model);
    assert_eq!(model.state, AppState::Main);
    assert!(model.screen.chat.is_empty());
    assert!(model.screen.faq_category.is_none());
}
