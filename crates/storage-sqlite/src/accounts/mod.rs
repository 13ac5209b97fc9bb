//! SQLite storage implementation for accounts and their balance history.

mod model;
mod repository;


pub use model::{AccountBalanceDB, AccountDB};
pub use repository::AccountRepository;
