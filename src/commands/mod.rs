pub mod settings;
pub mod streams;
