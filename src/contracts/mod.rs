pub mod buy_me_a_coffee;

pub use buy_me_a_coffee::*;
