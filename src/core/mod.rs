//! 核心层：错误、中间件、响应

pub mod error;
pub mod middleware;
pub mod response;
