use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Text-to-speech requests. Nothing comes back; a shell without a speech
/// engine ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpeechOperation {
    Speak {
        text: String,
        /// BCP-47 locale, `te-IN` or `en-IN`.
        locale: String,
        rate: f32,
    },
    Stop,
}

impl Operation for SpeechOperation {
    type Output = ();
}

#[derive(crux_core::macros::Capability)]
pub struct Speech<Ev> {
    context: CapabilityContext<SpeechOperation, Ev>,
}

impl<Ev> Speech<Ev> {
    pub fn new(context: CapabilityContext<SpeechOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Speech<Ev>
where
    Ev: Send + 'static,
{
    pub fn speak(&self, text: impl Into<String>, locale: &str, rate: f32) {
        self.notify(SpeechOperation::Speak {
            text: text.into(),
            locale: locale.to_string(),
            rate,
        });
    }

    pub fn stop(&self) {
        self.notify(SpeechOperation::Stop);
    }

    fn notify(&self, operation: SpeechOperation) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
