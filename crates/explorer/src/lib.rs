//! Anime and manga discovery library.
//!
//! Queries the Jikan API v4 catalog, keeps filter and paging state consistent,
//! and maintains a locally persisted wishlist.

pub mod api;
pub mod debounce;
pub mod display;
pub mod pagination;
pub mod query;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use api::{Catalog, CatalogError, JikanClient, RateLimiter};
pub use debounce::Debouncer;
pub use pagination::{compute_window, PageControls, PageIndicator};
pub use query::{build_query_params, reconcile, FilterPatch, FilterState, SearchQuery};
pub use session::{FetchTicket, SearchSession};
pub use storage::SlotStore;
pub use wishlist::{Wishlist, WishlistSlots};
