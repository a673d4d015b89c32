mod delay;
mod speech;
mod store;

pub use self::delay::{Delay, DelayOperation};
pub use self::speech::{Speech, SpeechOperation};
pub use self::store::{
    Store, StoreError, StoreOperation, StoreOutput, StoreResult, StoreTable,
};

pub use crux_core::render::Render;

use crate::event::Event;
// The Effect derive names the app type `App`.
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub store: Store<Event>,
    pub speech: Speech<Event>,
    pub delay: Delay<Event>,
}
