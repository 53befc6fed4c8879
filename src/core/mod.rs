pub mod assistant;
pub mod cache;
pub mod completion;
pub mod provider;
pub mod proxy;
pub mod text;
pub mod transcript;
pub mod video_id;
pub mod youtube;

#[cfg(test)]
pub(crate) mod fakes;

pub use assistant::*;
pub use cache::*;
pub use completion::*;
pub use proxy::*;
pub use text::*;
pub use transcript::*;
pub use video_id::*;
pub use youtube::*;
