pub mod overview;
pub mod token;
