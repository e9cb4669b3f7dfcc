// HTTP routes
pub mod crawl;
pub mod health;
pub mod search;

pub use crawl::*;
pub use health::*;
pub use search::*;
