pub mod config;
pub mod content;
pub mod conversation;
pub mod insights;
pub mod mood;
pub mod news;
pub mod papers;
pub mod resources;
pub mod responder;
pub mod search;
pub mod session;
pub mod util;
