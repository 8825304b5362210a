//! Domain values shared by the console screens.

pub mod filter;
pub mod item;
pub mod mock_test;
pub mod options;
pub mod order;
pub mod paginator;
pub mod types;
