pub mod handlers;
mod middleware;
pub mod router;
