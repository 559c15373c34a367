pub mod filter_state;
pub mod saved_search;
pub mod vocabulary;

pub use filter_state::{FilterState, RejectedCode};
pub use saved_search::SavedSearch;
