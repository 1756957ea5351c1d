mod handlers;
pub mod response;
mod routes;

pub use handlers::load_stylesheet;
pub use routes::create_router;
