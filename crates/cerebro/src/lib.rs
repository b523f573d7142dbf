pub mod errors;
pub mod providers;
