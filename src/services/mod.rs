/// Admin authentication and session handling.
pub mod auth_service;
/// OpenAPI documentation aggregate.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Live record read and write logic.
pub mod scoreboard_service;
/// Storage connection supervisor.
pub mod storage_supervisor;
