//! Client side of the catalog: API access plus the list, create, and edit
//! view state.

pub mod api;
pub mod form;
pub mod list;
pub mod views;

pub use api::{CatalogClient, ClientError, ClientResult};
pub use form::{BookForm, Field, FormErrors, FormState};
pub use list::{ListView, PendingDelete, SortOrder, Stats};
pub use views::{CreateView, EditView, Phase, SubmitOutcome};
