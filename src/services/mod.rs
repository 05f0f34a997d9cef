pub mod summarize;
pub mod transcript;
pub mod translate;
