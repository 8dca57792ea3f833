pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_fs;
pub mod repository_http;
pub mod route;
pub mod service;
