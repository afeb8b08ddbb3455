mod create_release_request;
mod edit_release_request;

pub use create_release_request::CreateReleaseRequest;
pub use edit_release_request::EditReleaseRequest;
