//! The browsing session behind the terminal surfaces
//!
//! [`LogViewer`] owns the log source and roster and keeps the state a user
//! builds up while browsing: the selected contact, the displayed month and day,
//! the running search and its results. Surfaces call its methods in response to
//! input and render the [`ViewEvent`]s it queues.
//!
//! Searching is driven by the surface: after [`LogViewer::start_search`] it calls
//! [`LogViewer::pump_search`] between input polls until it returns `false`.

pub mod events;
pub mod session;

pub use events::ViewEvent;
pub use session::LogViewer;
