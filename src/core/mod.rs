pub mod cache;
pub mod clipboard;
pub mod environment;
pub mod error;
pub mod events;
pub mod http_client;
pub mod locale;
pub mod session;
pub mod url_parser;
