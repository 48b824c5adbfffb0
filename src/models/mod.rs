// Models module

pub mod word;

pub use word::{StoreWordRequest, Word};
