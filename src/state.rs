use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::database::RecordStore;
use crate::error::ApiError;
use crate::middleware::auth::{Identity, Principal};

/// Services shared by every request task
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub keys: Arc<JwtKeys>,
    pub resource: Arc<str>,
    pub enforce_writes: bool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: JwtKeys,
        resource: impl Into<Arc<str>>,
        enforce_writes: bool,
    ) -> Self {
        Self {
            store,
            keys: Arc::new(keys),
            resource: resource.into(),
            enforce_writes,
        }
    }

    /// Gate for create/update/delete. With enforcement off the identity is
    /// passed through for logging only.
    pub fn authorize_write<'a>(&self, identity: &'a Identity) -> Result<Option<&'a Principal>, ApiError> {
        if self.enforce_writes {
            identity.require().map(Some)
        } else {
            Ok(identity.principal())
        }
    }
}
