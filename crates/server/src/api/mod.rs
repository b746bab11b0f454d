pub mod addon;
pub mod handlers;
pub mod middleware;
pub mod resolve;
pub mod routes;

pub use routes::create_router;
