use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}
