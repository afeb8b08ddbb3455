pub mod release_handler;
pub mod repository_handler;
