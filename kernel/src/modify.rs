mod book;
mod inventory;
mod ledger;
mod user;

pub use self::{book::*, inventory::*, ledger::*, user::*};
