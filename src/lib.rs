pub mod config;
pub mod logger;
pub mod server;
pub mod text_utils;
pub mod read_time;
pub mod content;
pub mod post_list;
pub mod manifest;
pub mod repository;
pub mod session;
pub mod view;
#[cfg(test)]
mod test_data;
