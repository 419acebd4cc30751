// Application layer - Use case interactors

pub mod container;
pub mod merge_interactor;
pub mod split_interactor;
pub mod volume_interactor;

// Re-export interactors
pub use merge_interactor::{MergeInteractor, MergeRequest, MergeSettings};
pub use split_interactor::{SplitInteractor, SplitRequest, SplitSettings};
pub use volume_interactor::{VolumeInteractor, VolumeRequest, VolumeSettings};
