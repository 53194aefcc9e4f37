//! Application state for the web server.

use std::sync::Arc;
use tokio::sync::Mutex;

use noteqa::generate::ResponseGenerator;
use noteqa::{LoadMode, ReviewSession};

/// Local-data notice shown at startup and on the page.
pub const LOCAL_DATA_WARNING: &str = "This app is running locally. Do not upload sensitive data \
if you are not sure of your environment or if this app is deployed online.";

/// Shared application state.
///
/// Every reviewer action takes the session lock, so actions are applied one
/// at a time in arrival order.
#[derive(Clone)]
pub struct AppState {
    /// The review session being driven by the form.
    pub session: Arc<Mutex<ReviewSession>>,
    /// Generator used for needs-generation uploads.
    pub generator: Arc<dyn ResponseGenerator>,
    /// Mode preselected in the form.
    pub default_mode: LoadMode,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        session: ReviewSession,
        generator: Arc<dyn ResponseGenerator>,
        default_mode: LoadMode,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            generator,
            default_mode,
        }
    }
}
