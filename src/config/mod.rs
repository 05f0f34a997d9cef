pub mod channels;
pub mod database;
