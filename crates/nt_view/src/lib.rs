//! View layer of the article browser: filter state, the filter form, and the
//! fetch lifecycle of the list and detail pages.

pub mod detail;
pub mod filter_state;
pub mod form;
pub mod inflight;
pub mod list;
pub mod render;
pub mod state;
pub mod test_utils;

pub use detail::{AnalysisTicket, ArticleDetailView, ArticleTicket};
pub use filter_state::FilterState;
pub use form::{FilterDraft, FilterFormController, FormField};
pub use inflight::{FetchOutcome, FetchTicket, InFlightRequests};
pub use list::{ArticleListView, ListOutcome, ListTicket, SKELETON_COUNT};
pub use render::{AnalysisPanel, AnalysisRender, ArticleCard, DetailRender, ListRender, SentimentBadge};
pub use state::{FetchState, ViewError};
