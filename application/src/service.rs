mod book;
mod lending;
mod user;

pub use self::{book::*, lending::*, user::*};
