pub mod archive;
pub mod db;
pub mod disk;
pub mod http;
pub mod migrate;
