//! Data models.

pub mod artifact;
pub mod color;
pub mod config;

pub use artifact::{
    Artifact, ArtifactCollection, ArtifactKind, ArtifactUpdate, CollectionUpdate,
    CollectionWithArtifacts, Mimetype, NewArtifact,
};
pub use color::{CmykRecord, ColorRecord, KmeansColors};
pub use config::AerialConfig;
