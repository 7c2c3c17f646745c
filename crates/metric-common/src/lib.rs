pub mod error;
pub mod mcp_api;
pub mod normalize;
pub mod redis;
pub mod webhook;
