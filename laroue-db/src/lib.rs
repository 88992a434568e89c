pub mod db;
pub mod exchange;
pub mod models;

pub use rusqlite;
