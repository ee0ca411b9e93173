//! 产品资源：CRUD 与嵌套评论

pub mod handler;
pub mod model;
pub mod service;
pub mod validator;
