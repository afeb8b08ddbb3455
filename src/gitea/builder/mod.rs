mod create_release_builder;
mod edit_release_builder;

pub use create_release_builder::CreateReleaseBuilder;
pub use edit_release_builder::EditReleaseBuilder;

use super::error::Result;

pub trait BuilderExecutor {
    type Output;

    async fn execute(self) -> Result<Self::Output>;
}
