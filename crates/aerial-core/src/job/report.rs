//! Per-artifact outcomes of a collection run.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Step of the per-artifact chain that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStage {
    Rasterize,
    Cluster,
    Persist,
}

impl fmt::Display for ArtifactStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rasterize => "rasterize",
            Self::Cluster => "cluster",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    /// Results were computed and stored.
    Processed {
        artifact_id: String,
        pages: u32,
        kmeans_colors_id: String,
        cmyk_id: String,
    },
    /// Results were already stored by an earlier run.
    Skipped { artifact_id: String },
    /// The chain stopped at `stage`.
    Failed {
        artifact_id: String,
        stage: ArtifactStage,
        reason: String,
    },
}

impl ArtifactOutcome {
    pub fn artifact_id(&self) -> &str {
        match self {
            Self::Processed { artifact_id, .. }
            | Self::Skipped { artifact_id }
            | Self::Failed { artifact_id, .. } => artifact_id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of running a collection, one outcome per artifact in collection
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub collection_id: String,
    pub label: String,
    pub outcomes: Vec<ArtifactOutcome>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl BatchReport {
    /// Artifacts whose results were computed in this run.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ArtifactOutcome::Processed { .. }))
            .count()
    }

    /// Artifacts left alone because an earlier run stored their results.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ArtifactOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn outcome(&self, artifact_id: &str) -> Option<&ArtifactOutcome> {
        self.outcomes.iter().find(|o| o.artifact_id() == artifact_id)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
