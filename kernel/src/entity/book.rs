mod id;
mod title;

pub use self::{id::*, title::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Book {
    id: BookId,
    title: BookTitle,
}

impl Book {
    pub fn new(id: BookId, title: BookTitle) -> Self {
        Self { id, title }
    }
}
