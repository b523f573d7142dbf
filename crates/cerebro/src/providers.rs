pub mod base;
pub mod configs;
pub mod openai;
pub mod utils;
