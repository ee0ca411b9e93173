//! 产品图片上传

pub mod handler;
pub mod model;
pub mod service;
