pub mod handlers;
pub mod model;
pub mod server;
pub mod state;

pub use model::{EchoClient, ModelClient};
pub use server::{router, run_server};
pub use state::AppState;
