//! Record store capability.
//!
//! The shell owns persistence (a hosted database in production). Every
//! request resolves to a [`StoreResult`]; the typed helpers on [`Store`]
//! narrow that to the shape each caller expects and apply the list
//! orderings the core relies on, whatever order the shell returns.

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::records::{
    active_faqs, sort_reminders, sort_scans, sort_shopping, FaqEntry, NewReminder, NewScanRecord,
    NewShoppingItem, RecordId, ReminderRecord, ScanRecord, ShoppingItemRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreTable {
    Scans,
    Reminders,
    ShoppingItems,
    Faqs,
}

impl StoreTable {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scans => "scan_history",
            Self::Reminders => "treatment_reminders",
            Self::ShoppingItems => "shopping_items",
            Self::Faqs => "faqs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOperation {
    CreateScan(NewScanRecord),
    /// Newest first.
    ListScans,
    CreateReminder(NewReminder),
    /// Soonest due first.
    ListReminders,
    SetReminderCompleted { id: RecordId, completed: bool },
    DeleteReminder { id: RecordId },
    CreateShoppingItem(NewShoppingItem),
    ListShoppingItems,
    SetItemPurchased { id: RecordId, purchased: bool },
    DeleteShoppingItem { id: RecordId },
    /// Active entries only, ordered by category.
    ListActiveFaqs,
}

impl StoreOperation {
    #[must_use]
    pub const fn table(&self) -> StoreTable {
        match self {
            Self::CreateScan(_) | Self::ListScans => StoreTable::Scans,
            Self::CreateReminder(_)
            | Self::ListReminders
            | Self::SetReminderCompleted { .. }
            | Self::DeleteReminder { .. } => StoreTable::Reminders,
            Self::CreateShoppingItem(_)
            | Self::ListShoppingItems
            | Self::SetItemPurchased { .. }
            | Self::DeleteShoppingItem { .. } => StoreTable::ShoppingItems,
            Self::ListActiveFaqs => StoreTable::Faqs,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateScan(_) => "create_scan",
            Self::ListScans => "list_scans",
            Self::CreateReminder(_) => "create_reminder",
            Self::ListReminders => "list_reminders",
            Self::SetReminderCompleted { .. } => "set_reminder_completed",
            Self::DeleteReminder { .. } => "delete_reminder",
            Self::CreateShoppingItem(_) => "create_shopping_item",
            Self::ListShoppingItems => "list_shopping_items",
            Self::SetItemPurchased { .. } => "set_item_purchased",
            Self::DeleteShoppingItem { .. } => "delete_shopping_item",
            Self::ListActiveFaqs => "list_active_faqs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOutput {
    Created { id: RecordId },
    Scans(Vec<ScanRecord>),
    Reminders(Vec<ReminderRecord>),
    ShoppingItems(Vec<ShoppingItemRecord>),
    Faqs(Vec<FaqEntry>),
    Done,
}

impl StoreOutput {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Scans(_) => "scans",
            Self::Reminders(_) => "reminders",
            Self::ShoppingItems(_) => "shopping_items",
            Self::Faqs(_) => "faqs",
            Self::Done => "done",
        }
    }

    fn mismatch(self, expected: &str) -> StoreError {
        StoreError::UnexpectedOutput {
            expected: expected.to_string(),
            found: self.kind().to_string(),
        }
    }

    pub fn into_created(self) -> Result<RecordId, StoreError> {
        match self {
            Self::Created { id } => Ok(id),
            other => Err(other.mismatch("created")),
        }
    }

    pub fn into_scans(self) -> Result<Vec<ScanRecord>, StoreError> {
        match self {
            Self::Scans(mut scans) => {
                sort_scans(&mut scans);
                Ok(scans)
            }
            other => Err(other.mismatch("scans")),
        }
    }

    pub fn into_reminders(self) -> Result<Vec<ReminderRecord>, StoreError> {
        match self {
            Self::Reminders(mut reminders) => {
                sort_reminders(&mut reminders);
                Ok(reminders)
            }
            other => Err(other.mismatch("reminders")),
        }
    }

    pub fn into_shopping_items(self) -> Result<Vec<ShoppingItemRecord>, StoreError> {
        match self {
            Self::ShoppingItems(mut items) => {
                sort_shopping(&mut items);
                Ok(items)
            }
            other => Err(other.mismatch("shopping_items")),
        }
    }

    pub fn into_faqs(self) -> Result<Vec<FaqEntry>, StoreError> {
        match self {
            Self::Faqs(faqs) => Ok(active_faqs(faqs)),
            other => Err(other.mismatch("faqs")),
        }
    }

    pub fn into_done(self) -> Result<(), StoreError> {
        match self {
            Self::Done => Ok(()),
            other => Err(other.mismatch("done")),
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("not authorized")]
    Unauthorized,

    #[error("record not found: {id}")]
    NotFound { id: String },

    #[error("rejected by store: {message}")]
    Rejected { message: String },

    #[error("unexpected store output: expected {expected}, found {found}")]
    UnexpectedOutput { expected: String, found: String },
}

impl StoreError {
    /// Worth repeating by hand; the core never retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

pub type StoreResult = Result<StoreOutput, StoreError>;

impl Operation for StoreOperation {
    type Output = StoreResult;
}

#[derive(crux_core::macros::Capability)]
pub struct Store<Ev> {
    context: CapabilityContext<StoreOperation, Ev>,
}

impl<Ev> Store<Ev> {
    pub fn new(context: CapabilityContext<StoreOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Store<Ev>
where
    Ev: Send + 'static,
{
    pub fn create_scan<F>(&self, record: NewScanRecord, make_event: F)
    where
        F: FnOnce(Result<RecordId, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::CreateScan(record), move |out| {
            make_event(out.and_then(StoreOutput::into_created))
        });
    }

    pub fn list_scans<F>(&self, make_event: F)
    where
        F: FnOnce(Result<Vec<ScanRecord>, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::ListScans, move |out| {
            make_event(out.and_then(StoreOutput::into_scans))
        });
    }

    pub fn create_reminder<F>(&self, reminder: NewReminder, make_event: F)
    where
        F: FnOnce(Result<RecordId, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::CreateReminder(reminder), move |out| {
            make_event(out.and_then(StoreOutput::into_created))
        });
    }

    pub fn list_reminders<F>(&self, make_event: F)
    where
        F: FnOnce(Result<Vec<ReminderRecord>, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::ListReminders, move |out| {
            make_event(out.and_then(StoreOutput::into_reminders))
        });
    }

    pub fn set_reminder_completed<F>(&self, id: RecordId, completed: bool, make_event: F)
    where
        F: FnOnce(Result<(), StoreError>) -> Ev + Send + 'static,
    {
        self.request(
            StoreOperation::SetReminderCompleted { id, completed },
            move |out| make_event(out.and_then(StoreOutput::into_done)),
        );
    }

    pub fn delete_reminder<F>(&self, id: RecordId, make_event: F)
    where
        F: FnOnce(Result<(), StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::DeleteReminder { id }, move |out| {
            make_event(out.and_then(StoreOutput::into_done))
        });
    }

    pub fn create_shopping_item<F>(&self, item: NewShoppingItem, make_event: F)
    where
        F: FnOnce(Result<RecordId, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::CreateShoppingItem(item), move |out| {
            make_event(out.and_then(StoreOutput::into_created))
        });
    }

    pub fn list_shopping_items<F>(&self, make_event: F)
    where
        F: FnOnce(Result<Vec<ShoppingItemRecord>, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::ListShoppingItems, move |out| {
            make_event(out.and_then(StoreOutput::into_shopping_items))
        });
    }

    pub fn set_item_purchased<F>(&self, id: RecordId, purchased: bool, make_event: F)
    where
        F: FnOnce(Result<(), StoreError>) -> Ev + Send + 'static,
    {
        self.request(
            StoreOperation::SetItemPurchased { id, purchased },
            move |out| make_event(out.and_then(StoreOutput::into_done)),
        );
    }

    pub fn delete_shopping_item<F>(&self, id: RecordId, make_event: F)
    where
        F: FnOnce(Result<(), StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::DeleteShoppingItem { id }, move |out| {
            make_event(out.and_then(StoreOutput::into_done))
        });
    }

    pub fn list_active_faqs<F>(&self, make_event: F)
    where
        F: FnOnce(Result<Vec<FaqEntry>, StoreError>) -> Ev + Send + 'static,
    {
        self.request(StoreOperation::ListActiveFaqs, move |out| {
            make_event(out.and_then(StoreOutput::into_faqs))
        });
    }

    fn request<F>(&self, operation: StoreOperation, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        debug!(
            operation = operation.name(),
            table = operation.table().as_str(),
            "store request"
        );
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(output));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(id: &str, scanned_at_ms: u64) -> ScanRecord {
        ScanRecord {
            id: RecordId::new(id),
            image_url: format!("https://cdn.example/{id}.jpg"),
            diagnosis: crate::diagnosis::diagnosis_for(crate::DiseaseCategory::Rust),
            scanned_at_ms,
            created_at_ms: scanned_at_ms,
        }
    }

    #[test]
    fn operations_know_their_table() {
        assert_eq!(StoreOperation::ListScans.table(), StoreTable::Scans);
        assert_eq!(
            StoreOperation::DeleteShoppingItem { id: RecordId::new("x") }.table(),
            StoreTable::ShoppingItems
        );
        assert_eq!(StoreOperation::ListActiveFaqs.table().as_str(), "faqs");
    }

    #[test]
    fn scans_come_back_newest_first() {
        let out = StoreOutput::Scans(vec![scan("old", 1), scan("new", 3), scan("mid", 2)]);
        let ids: Vec<_> = out
            .into_scans()
            .unwrap()
            .into_iter()
            .map(|s| s.id.0)
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn mismatched_output_is_an_error() {
        let err = StoreOutput::Done.into_created().unwrap_err();
        assert_eq!(
            err,
            StoreError::UnexpectedOutput {
                expected: "created".into(),
                found: "done".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(StoreError::Network {
            message: "offline".into()
        }
        .is_retryable());
        assert!(!StoreError::Unauthorized.is_retryable());
    }
}
