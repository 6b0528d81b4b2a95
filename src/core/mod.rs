pub mod driver;
pub mod instruction;
pub mod processor;
pub mod ram;
pub mod rom;
