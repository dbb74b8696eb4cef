//! Point module: three-layer architecture (domain, repository, service).
//!
//! The service never touches a database handle directly; it is handed a
//! `PointRepository` at construction.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::PointService;
