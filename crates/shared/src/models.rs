//! Data models for the project.
//!
//! This module defines the catalog entries as delivered by the Jikan API,
//! the media kind that partitions them, and the page of results a query
//! produces.

use serde::{Deserialize, Serialize};

/// Media kind, which also selects the catalog endpoint (`/anime` or `/manga`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Anime,
    Manga,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Anime, MediaKind::Manga];

    /// Path segment used by both the API and MyAnimeList URLs
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Anime => "anime",
            MediaKind::Manga => "manga",
        }
    }

    /// Determine the kind from a canonical MyAnimeList URL.
    ///
    /// The first path segment after the host decides: `manga` maps to
    /// [`MediaKind::Manga`], anything else (including a missing or malformed
    /// URL) to [`MediaKind::Anime`].
    pub fn from_url(url: &str) -> Self {
        let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let segment = without_scheme
            .split('/')
            .filter(|part| !part.is_empty())
            .nth(1);

        match segment {
            Some("manga") => MediaKind::Manga,
            _ => MediaKind::Anime,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anime" => Ok(MediaKind::Anime),
            "manga" => Ok(MediaKind::Manga),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Compound identity of a catalog entry.
///
/// MyAnimeList ids are only unique within one kind, so `(kind, id)` is the
/// unambiguous key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaKey {
    pub kind: MediaKind,
    pub id: u32,
}

impl std::fmt::Display for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// An anime or manga entry from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub mal_id: u32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub images: MediaImages,
    #[serde(default)]
    pub trailer: Option<Trailer>,

    // Titles
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,

    // Type and status
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,

    // Length (episodes for anime, chapters/volumes for manga)
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub chapters: Option<u32>,
    #[serde(default)]
    pub volumes: Option<u32>,

    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,

    // Classifications
    #[serde(default)]
    pub genres: Vec<MalEntity>,
    #[serde(default)]
    pub studios: Vec<MalEntity>,
    #[serde(default)]
    pub serializations: Vec<MalEntity>,
}

impl MediaItem {
    /// Kind derived from the canonical URL
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_url(&self.url)
    }

    pub fn key(&self) -> MediaKey {
        MediaKey {
            kind: self.kind(),
            id: self.mal_id,
        }
    }

    /// Episode count for anime, chapter count for manga
    pub fn length(&self) -> Option<u32> {
        match self.kind() {
            MediaKind::Anime => self.episodes,
            MediaKind::Manga => self.chapters,
        }
    }

    /// Studios for anime, serializing publishers for manga
    pub fn creators(&self) -> &[MalEntity] {
        match self.kind() {
            MediaKind::Anime => &self.studios,
            MediaKind::Manga => &self.serializations,
        }
    }

    /// Best available cover image URL
    pub fn cover_url(&self) -> Option<&str> {
        let jpg = &self.images.jpg;
        jpg.large_image_url
            .as_deref()
            .or(jpg.image_url.as_deref())
            .or(jpg.small_image_url.as_deref())
    }
}

/// Cover images
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaImages {
    #[serde(default)]
    pub jpg: ImageSet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Trailer reference (anime only)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trailer {
    pub youtube_id: Option<String>,
    pub url: Option<String>,
    pub embed_url: Option<String>,
}

/// MAL entity (genre, studio, magazine, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MalEntity {
    pub mal_id: u32,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Pagination state of a result page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub last_page: u32,
    pub current_page: u32,
    pub has_next: bool,
}

/// One page of query results, replaced wholesale on every query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultPage {
    pub items: Vec<MediaItem>,
    pub pagination: Option<PaginationMeta>,
}

impl ResultPage {
    /// The "no results" page: no items and no pagination
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_url() {
        assert_eq!(
            MediaKind::from_url("https://myanimelist.net/manga/2/Berserk"),
            MediaKind::Manga
        );
        assert_eq!(
            MediaKind::from_url("https://myanimelist.net/anime/5114/Fullmetal_Alchemist__Brotherhood"),
            MediaKind::Anime
        );
        assert_eq!(MediaKind::from_url(""), MediaKind::Anime);
        assert_eq!(MediaKind::from_url("not a url"), MediaKind::Anime);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Manga".parse::<MediaKind>().unwrap(), MediaKind::Manga);
        assert_eq!("anime".parse::<MediaKind>().unwrap(), MediaKind::Anime);
        assert!("novel".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_deserialize_manga_entry() {
        let json = r#"{
            "mal_id": 2,
            "url": "https://myanimelist.net/manga/2/Berserk",
            "images": {"jpg": {"image_url": "a.jpg", "small_image_url": null, "large_image_url": "b.jpg"}},
            "title": "Berserk",
            "type": "Manga",
            "chapters": null,
            "volumes": null,
            "status": "Publishing",
            "score": 9.47,
            "genres": [{"mal_id": 1, "type": "manga", "name": "Action", "url": "x"}],
            "serializations": [{"mal_id": 2, "type": "manga", "name": "Young Animal", "url": "y"}],
            "members": 730000
        }"#;

        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.key(), MediaKey { kind: MediaKind::Manga, id: 2 });
        assert_eq!(item.cover_url(), Some("b.jpg"));
        assert_eq!(item.creators()[0].name, "Young Animal");
        assert!(item.trailer.is_none());
        assert!(item.studios.is_empty());
    }

    #[test]
    fn test_length_follows_kind() {
        let json = r#"{
            "mal_id": 5114,
            "url": "https://myanimelist.net/anime/5114",
            "title": "Fullmetal Alchemist: Brotherhood",
            "episodes": 64,
            "chapters": 3
        }"#;

        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.length(), Some(64));
    }
}
