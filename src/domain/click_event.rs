//! Click event model for asynchronous click counting.

/// A click observed on the redirect path, passed from the HTTP handler to
/// the background worker via a bounded channel.
///
/// The event is denormalized to the short code so the handler never performs
/// an extra lookup — on a cache hit the link id is not even known.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
}

impl ClickEvent {
    pub fn new(code: String) -> Self {
        Self { code }
    }
}
