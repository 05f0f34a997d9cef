pub mod captions;
pub mod news;
