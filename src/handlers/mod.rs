pub mod api;
pub mod feed;
pub mod health;
pub mod page;

pub use feed::*;
pub use health::*;
pub use page::*;
