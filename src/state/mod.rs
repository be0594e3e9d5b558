//! Table state machines (pure).
//!
//! Every transition here is a plain function or method over owned state,
//! testable without a terminal. Nothing in this module performs I/O; requests
//! that need the outside world (fetches, saves) are handed back to the caller.

pub mod coordinator;
pub mod debounce;
pub mod inline_edit;
pub mod load_state;
pub mod reorder;
pub mod selection;
pub mod session;
pub mod table_state;
pub mod text_input;

// Re-export for convenience
pub use coordinator::{Coordinator, DataMode, DataQuery, FetchRequest, FetchTicket, Outcome};
pub use debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use inline_edit::{
    EditKey, EditKeyOutcome, EditState, EditingCell, InlineEditor, SaveOutcome, SaveRequest, SaveTicket,
};
pub use load_state::LoadState;
pub use reorder::{ReorderMode, ReorderProtocol};
pub use selection::{BulkActions, BulkHandler, PageSelection, SelectionSnapshots};
pub use session::{
    FetchResponse, NoCallbacks, TableCallbacks, TableFeatures, TableSession, TableSessionBuilder,
    DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE,
};
pub use table_state::{ChangeSet, StateListener, SubscriptionId, TableState, TableStatePatch, TableStore};
pub use text_input::TextInput;
