mod book;
mod borrow;
mod record;
mod user;

pub use self::{book::*, borrow::*, record::*, user::*};
