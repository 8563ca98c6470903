pub mod bump;
pub mod export;
pub mod filter;
pub mod import;
pub mod layout;
pub mod stats;
pub mod store;
