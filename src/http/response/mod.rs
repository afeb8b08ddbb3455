mod state;

pub use state::Response;
pub use state::ResponseHandler;
