use axum::{
    extract::{RawQuery, State},
    Json,
};

use crate::database::{Record, SearchFilter};
use crate::error::ApiError;
use crate::state::AppState;

use super::log_failure;

/// Query parameters of the list endpoint. Parsed by hand so that repeated or
/// unexpected keys never turn into a client error.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text term matched against title, body and tags
    pub search: Option<String>,
}

impl ListQuery {
    /// First `search` value wins; `busca` is only consulted when `search` is absent
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut search = None;
        let mut busca = None;
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "search" if search.is_none() => search = Some(value.into_owned()),
                "busca" if busca.is_none() => busca = Some(value.into_owned()),
                _ => {}
            }
        }

        Self { search: search.or(busca) }
    }
}

/// GET /{resource} - list records, newest first, optionally filtered
pub async fn get(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Record>>, ApiError> {
    let query = ListQuery::from_raw(raw.as_deref());
    let filter = SearchFilter::from_param(query.search.as_deref());

    match state.store.list(&filter).await {
        Ok(records) => {
            tracing::info!(
                operation = "list",
                resource = %state.resource,
                searched = filter.term().is_some(),
                count = records.len(),
                "Records listed"
            );
            Ok(Json(records))
        }
        Err(e) => Err(log_failure("list", &state, None, e.into())),
    }
}
