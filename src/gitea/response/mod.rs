mod release_response;

pub use release_response::AttachmentResponse;
pub use release_response::ReleaseResponse;
