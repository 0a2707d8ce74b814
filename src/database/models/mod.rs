pub mod category;
pub mod overview;
pub mod transaction;
pub mod user;

pub use category::Category;
pub use overview::{CategoryTotals, Overview};
pub use transaction::{Transaction, TransactionKind};
pub use user::{Role, User};
