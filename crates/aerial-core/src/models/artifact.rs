//! Artifact and artifact collection models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A batch of artifacts submitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactCollection {
    /// Collection identifier (`artc_` prefix).
    pub id: String,

    /// Human label. Also the key of the push channel notified on completion.
    pub label: String,

    /// Set once every artifact has finished, successfully or not.
    pub processed: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One uploaded file within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier (`art_` prefix).
    pub id: String,

    /// Owning collection.
    pub collection_id: String,

    /// Display filename.
    pub label: String,

    pub mimetype: Mimetype,

    pub kind: ArtifactKind,

    /// Number of rasterized pages, unknown until processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,

    /// Public URL of the processed source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Dominant colors record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kmeans_colors_id: Option<String>,

    /// Ink coverage record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmyk_id: Option<String>,

    /// Why processing stopped, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    /// Whether both result records have been attached.
    pub fn has_results(&self) -> bool {
        self.kmeans_colors_id.is_some() && self.cmyk_id.is_some()
    }
}

/// A collection together with its artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionWithArtifacts {
    #[serde(flatten)]
    pub collection: ArtifactCollection,
    pub artifacts: Vec<Artifact>,
}

/// Kind of artifact, deciding how it is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    /// Already a single PNG page.
    Image,
    /// PDF or word-processor document.
    Document,
}

/// Supported upload mimetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mimetype {
    ImagePng,
    ImageJpeg,
    ImageJpg,
    ImageWebp,
    ImageSvg,
    ImageGif,
    ImageTiff,
    ApplicationPdf,
    ApplicationDocx,
    ApplicationMsword,
}

impl Mimetype {
    pub const ALL: [Mimetype; 10] = [
        Mimetype::ImagePng,
        Mimetype::ImageJpeg,
        Mimetype::ImageJpg,
        Mimetype::ImageWebp,
        Mimetype::ImageSvg,
        Mimetype::ImageGif,
        Mimetype::ImageTiff,
        Mimetype::ApplicationPdf,
        Mimetype::ApplicationDocx,
        Mimetype::ApplicationMsword,
    ];

    /// MIME type string.
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::ImagePng => "image/png",
            Self::ImageJpeg => "image/jpeg",
            Self::ImageJpg => "image/jpg",
            Self::ImageWebp => "image/webp",
            Self::ImageSvg => "image/svg+xml",
            Self::ImageGif => "image/gif",
            Self::ImageTiff => "image/tiff",
            Self::ApplicationPdf => "application/pdf",
            Self::ApplicationDocx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::ApplicationMsword => "application/msword",
        }
    }

    /// Look up by MIME type string.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_mime() == mime)
    }

    /// Look up by file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "tif" => Some(Self::ImageTiff),
            _ => Self::ALL
                .into_iter()
                .find(|m| m.extension().trim_start_matches('.') == ext),
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::ImagePng => ".png",
            Self::ImageJpeg => ".jpeg",
            Self::ImageJpg => ".jpg",
            Self::ImageWebp => ".webp",
            Self::ImageSvg => ".svg",
            Self::ImageGif => ".gif",
            Self::ImageTiff => ".tiff",
            Self::ApplicationPdf => ".pdf",
            Self::ApplicationDocx => ".docx",
            Self::ApplicationMsword => ".doc",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::ImagePng
                | Self::ImageJpeg
                | Self::ImageJpg
                | Self::ImageWebp
                | Self::ImageSvg
                | Self::ImageGif
                | Self::ImageTiff
        )
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::ApplicationPdf)
    }

    /// Word-processor documents that need converting to PDF first.
    pub fn is_word(&self) -> bool {
        matches!(self, Self::ApplicationDocx | Self::ApplicationMsword)
    }

    /// Artifact kind for uploads of this type.
    pub fn kind(&self) -> ArtifactKind {
        if self.is_image() {
            ArtifactKind::Image
        } else {
            ArtifactKind::Document
        }
    }
}

/// Data for a new artifact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    /// Identifier to use; the store generates one when unset.
    pub id: Option<String>,
    pub label: String,
    pub mimetype: Mimetype,
    pub kind: ArtifactKind,
}

/// Output fields written once an artifact is processed.
///
/// Once both result ids are set, any earlier failure reason is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactUpdate {
    pub url: Option<String>,
    pub pages: Option<u32>,
    pub kmeans_colors_id: Option<String>,
    pub cmyk_id: Option<String>,
}

/// Mutable collection fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionUpdate {
    pub processed: Option<bool>,
}
