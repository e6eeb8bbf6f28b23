//! Filter state, reconciliation, and query parameter construction.
//!
//! Sub-type and status domains depend on the media kind, so their values are
//! typed per kind. [`reconcile`] is the only way the explorer moves from one
//! filter state to the next, which keeps every state consistent with its kind.

use shared::MediaKind;
use tracing::debug;

/// Page size requested from the catalog
pub const PAGE_LIMIT: u32 = 24;

/// Normalize user input for matching against parameter values
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Anime format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimeType {
    Tv,
    Movie,
    Ova,
    Special,
    Ona,
}

impl AnimeType {
    pub const ALL: [AnimeType; 5] = [
        AnimeType::Tv,
        AnimeType::Movie,
        AnimeType::Ova,
        AnimeType::Special,
        AnimeType::Ona,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            AnimeType::Tv => "tv",
            AnimeType::Movie => "movie",
            AnimeType::Ova => "ova",
            AnimeType::Special => "special",
            AnimeType::Ona => "ona",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnimeType::Tv => "TV",
            AnimeType::Movie => "Movie",
            AnimeType::Ova => "OVA",
            AnimeType::Special => "Special",
            AnimeType::Ona => "ONA",
        }
    }
}

/// Manga format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MangaType {
    Manga,
    Novel,
    LightNovel,
    Oneshot,
    Doujin,
    Manhwa,
    Manhua,
}

impl MangaType {
    pub const ALL: [MangaType; 7] = [
        MangaType::Manga,
        MangaType::Novel,
        MangaType::LightNovel,
        MangaType::Oneshot,
        MangaType::Doujin,
        MangaType::Manhwa,
        MangaType::Manhua,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            MangaType::Manga => "manga",
            MangaType::Novel => "novel",
            MangaType::LightNovel => "lightnovel",
            MangaType::Oneshot => "oneshot",
            MangaType::Doujin => "doujin",
            MangaType::Manhwa => "manhwa",
            MangaType::Manhua => "manhua",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MangaType::Manga => "Manga",
            MangaType::Novel => "Novel",
            MangaType::LightNovel => "Light Novel",
            MangaType::Oneshot => "One-shot",
            MangaType::Doujin => "Doujinshi",
            MangaType::Manhwa => "Manhwa",
            MangaType::Manhua => "Manhua",
        }
    }
}

/// Format filter, scoped to a media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubType {
    Anime(AnimeType),
    Manga(MangaType),
}

impl SubType {
    pub fn kind(self) -> MediaKind {
        match self {
            SubType::Anime(_) => MediaKind::Anime,
            SubType::Manga(_) => MediaKind::Manga,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SubType::Anime(t) => t.as_param(),
            SubType::Manga(t) => t.as_param(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubType::Anime(t) => t.label(),
            SubType::Manga(t) => t.label(),
        }
    }

    /// Parse a format name within the domain of `kind`
    pub fn parse(kind: MediaKind, value: &str) -> Option<Self> {
        let value = normalize(value);
        match kind {
            MediaKind::Anime => AnimeType::ALL
                .into_iter()
                .find(|t| t.as_param() == value)
                .map(SubType::Anime),
            MediaKind::Manga => MangaType::ALL
                .into_iter()
                .find(|t| t.as_param() == value)
                .map(SubType::Manga),
        }
    }

    /// All formats valid for `kind`
    pub fn options(kind: MediaKind) -> Vec<SubType> {
        match kind {
            MediaKind::Anime => AnimeType::ALL.into_iter().map(SubType::Anime).collect(),
            MediaKind::Manga => MangaType::ALL.into_iter().map(SubType::Manga).collect(),
        }
    }
}

/// Airing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimeStatus {
    Airing,
    Complete,
    Upcoming,
}

impl AnimeStatus {
    pub const ALL: [AnimeStatus; 3] = [
        AnimeStatus::Airing,
        AnimeStatus::Complete,
        AnimeStatus::Upcoming,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            AnimeStatus::Airing => "airing",
            AnimeStatus::Complete => "complete",
            AnimeStatus::Upcoming => "upcoming",
        }
    }
}

/// Publishing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MangaStatus {
    Publishing,
    Complete,
    Hiatus,
    Discontinued,
    Upcoming,
}

impl MangaStatus {
    pub const ALL: [MangaStatus; 5] = [
        MangaStatus::Publishing,
        MangaStatus::Complete,
        MangaStatus::Hiatus,
        MangaStatus::Discontinued,
        MangaStatus::Upcoming,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            MangaStatus::Publishing => "publishing",
            MangaStatus::Complete => "complete",
            MangaStatus::Hiatus => "hiatus",
            MangaStatus::Discontinued => "discontinued",
            MangaStatus::Upcoming => "upcoming",
        }
    }
}

/// Status filter, scoped to a media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Anime(AnimeStatus),
    Manga(MangaStatus),
}

impl Status {
    pub fn kind(self) -> MediaKind {
        match self {
            Status::Anime(_) => MediaKind::Anime,
            Status::Manga(_) => MediaKind::Manga,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Status::Anime(s) => s.as_param(),
            Status::Manga(s) => s.as_param(),
        }
    }

    /// Parse a status name within the domain of `kind`
    pub fn parse(kind: MediaKind, value: &str) -> Option<Self> {
        let value = normalize(value);
        // "completed" is what the catalog reports on entries
        let value = if value == "completed" { "complete".to_string() } else { value };
        match kind {
            MediaKind::Anime => AnimeStatus::ALL
                .into_iter()
                .find(|s| s.as_param() == value)
                .map(Status::Anime),
            MediaKind::Manga => MangaStatus::ALL
                .into_iter()
                .find(|s| s.as_param() == value)
                .map(Status::Manga),
        }
    }

    pub fn options(kind: MediaKind) -> Vec<Status> {
        match kind {
            MediaKind::Anime => AnimeStatus::ALL.into_iter().map(Status::Anime).collect(),
            MediaKind::Manga => MangaStatus::ALL.into_iter().map(Status::Manga).collect(),
        }
    }
}

/// Audience rating (anime only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentRating {
    G,
    Pg,
    Pg13,
    R17,
    R,
    Rx,
}

impl ContentRating {
    pub const ALL: [ContentRating; 6] = [
        ContentRating::G,
        ContentRating::Pg,
        ContentRating::Pg13,
        ContentRating::R17,
        ContentRating::R,
        ContentRating::Rx,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            ContentRating::G => "g",
            ContentRating::Pg => "pg",
            ContentRating::Pg13 => "pg13",
            ContentRating::R17 => "r17",
            ContentRating::R => "r",
            ContentRating::Rx => "rx",
        }
    }
}

impl std::fmt::Display for ContentRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

impl std::str::FromStr for ContentRating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = normalize(s);
        ContentRating::ALL
            .into_iter()
            .find(|r| r.as_param() == value)
            .ok_or_else(|| anyhow::anyhow!("Invalid content rating: {}", s))
    }
}

/// The user's current query refinement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    /// `None` means no kind was chosen; the anime endpoint is used
    pub media_kind: Option<MediaKind>,
    pub sub_type: Option<SubType>,
    pub status: Option<Status>,
    pub content_rating: Option<ContentRating>,
}

impl FilterState {
    /// State after a reset: anime selected, nothing else set
    pub fn initial() -> Self {
        Self::for_kind(MediaKind::Anime)
    }

    pub fn for_kind(kind: MediaKind) -> Self {
        Self {
            media_kind: Some(kind),
            ..Default::default()
        }
    }

    /// Kind used for the endpoint and for value domains
    pub fn effective_kind(&self) -> MediaKind {
        self.media_kind.unwrap_or(MediaKind::Anime)
    }

    pub fn apply(&self, patch: FilterPatch) -> Self {
        reconcile(self, patch)
    }

    /// True when no refinement beyond the media kind is set
    pub fn is_unrefined(&self) -> bool {
        self.sub_type.is_none() && self.status.is_none() && self.content_rating.is_none()
    }
}

/// A single user interaction with the filter controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPatch {
    /// Discard every refinement
    Reset,
    /// Select a media kind (radio selection)
    MediaKind(MediaKind),
    /// Toggle a format
    SubType(SubType),
    /// Toggle a status
    Status(Status),
    /// Toggle a content rating
    ContentRating(ContentRating),
}

fn toggle<T: PartialEq>(current: Option<T>, value: T) -> Option<T> {
    if current.as_ref() == Some(&value) {
        None
    } else {
        Some(value)
    }
}

/// Apply `patch` to `current`, keeping every field valid for the active kind.
///
/// Changing the kind clears format and status, and clears the content rating
/// when the new kind is manga. Format, status, and rating patches toggle: the
/// value that is already set is cleared. Values outside the active kind's
/// domain are rejected and leave the state unchanged.
pub fn reconcile(current: &FilterState, patch: FilterPatch) -> FilterState {
    let kind = current.effective_kind();

    match patch {
        FilterPatch::Reset => FilterState::initial(),
        FilterPatch::MediaKind(new_kind) => {
            if current.media_kind == Some(new_kind) {
                return *current;
            }
            FilterState {
                media_kind: Some(new_kind),
                sub_type: None,
                status: None,
                content_rating: match new_kind {
                    MediaKind::Anime => current.content_rating,
                    MediaKind::Manga => None,
                },
            }
        }
        FilterPatch::SubType(sub_type) => {
            if sub_type.kind() != kind {
                debug!(kind = %kind, sub_type = sub_type.as_param(), "Ignoring format from another kind");
                return *current;
            }
            FilterState {
                sub_type: toggle(current.sub_type, sub_type),
                ..*current
            }
        }
        FilterPatch::Status(status) => {
            if status.kind() != kind {
                debug!(kind = %kind, status = status.as_param(), "Ignoring status from another kind");
                return *current;
            }
            FilterState {
                status: toggle(current.status, status),
                ..*current
            }
        }
        FilterPatch::ContentRating(rating) => {
            if kind != MediaKind::Anime {
                debug!(kind = %kind, rating = %rating, "Ignoring content rating outside anime");
                return *current;
            }
            FilterState {
                content_rating: toggle(current.content_rating, rating),
                ..*current
            }
        }
    }
}

/// Build the flat parameter list for a catalog request.
///
/// The media kind selects the endpoint and is never sent as a parameter.
pub fn build_query_params(
    term: Option<&str>,
    page: u32,
    filters: &FilterState,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(6);

    if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
        params.push(("q", term.to_string()));
    }
    params.push(("page", page.max(1).to_string()));
    params.push(("limit", PAGE_LIMIT.to_string()));

    if let Some(sub_type) = filters.sub_type {
        params.push(("type", sub_type.as_param().to_string()));
    }
    if let Some(status) = filters.status {
        params.push(("status", status.as_param().to_string()));
    }
    if let Some(rating) = filters.content_rating {
        params.push(("rating", rating.as_param().to_string()));
    }

    params
}

/// One catalog request: created per fetch, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
    pub filters: FilterState,
}

impl SearchQuery {
    pub fn kind(&self) -> MediaKind {
        self.filters.effective_kind()
    }

    /// Keyword search when a term is present, ranked listing otherwise
    pub fn is_keyword_search(&self) -> bool {
        !self.term.trim().is_empty()
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        build_query_params(Some(&self.term), self.page, &self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anime_filters() -> FilterState {
        FilterState {
            media_kind: Some(MediaKind::Anime),
            sub_type: Some(SubType::Anime(AnimeType::Movie)),
            status: Some(Status::Anime(AnimeStatus::Airing)),
            content_rating: Some(ContentRating::Pg13),
        }
    }

    #[test]
    fn test_reset_returns_initial_state() {
        let state = reconcile(&anime_filters(), FilterPatch::Reset);
        assert_eq!(state, FilterState::initial());
        assert_eq!(state.media_kind, Some(MediaKind::Anime));
        assert!(state.is_unrefined());
    }

    #[test]
    fn test_switching_to_manga_clears_kind_scoped_fields() {
        let state = reconcile(&anime_filters(), FilterPatch::MediaKind(MediaKind::Manga));
        assert_eq!(state, FilterState::for_kind(MediaKind::Manga));
    }

    #[test]
    fn test_switching_to_anime_keeps_rating() {
        let start = FilterState {
            media_kind: None,
            sub_type: Some(SubType::Anime(AnimeType::Tv)),
            status: None,
            content_rating: Some(ContentRating::G),
        };
        let state = reconcile(&start, FilterPatch::MediaKind(MediaKind::Anime));
        assert_eq!(state.media_kind, Some(MediaKind::Anime));
        assert_eq!(state.sub_type, None);
        assert_eq!(state.content_rating, Some(ContentRating::G));
    }

    #[test]
    fn test_selecting_active_kind_is_noop() {
        let start = anime_filters();
        assert_eq!(reconcile(&start, FilterPatch::MediaKind(MediaKind::Anime)), start);
    }

    #[test]
    fn test_same_value_toggles_off() {
        let start = FilterState::initial();
        let patch = FilterPatch::SubType(SubType::Anime(AnimeType::Ova));

        let once = reconcile(&start, patch);
        assert_eq!(once.sub_type, Some(SubType::Anime(AnimeType::Ova)));

        let twice = reconcile(&once, patch);
        assert_eq!(twice.sub_type, None);
    }

    #[test]
    fn test_different_value_replaces() {
        let start = anime_filters();
        let state = reconcile(&start, FilterPatch::Status(Status::Anime(AnimeStatus::Upcoming)));
        assert_eq!(state.status, Some(Status::Anime(AnimeStatus::Upcoming)));
        assert_eq!(state.sub_type, start.sub_type);
    }

    #[test]
    fn test_repeated_replacement_clears_field() {
        let state = FilterState {
            media_kind: None,
            status: Some(Status::Anime(AnimeStatus::Upcoming)),
            ..FilterState::default()
        };
        let patch = FilterPatch::Status(Status::Anime(AnimeStatus::Airing));

        let once = reconcile(&state, patch);
        assert_eq!(once.status, Some(Status::Anime(AnimeStatus::Airing)));

        // The earlier value is not remembered
        let twice = reconcile(&once, patch);
        assert_eq!(twice.status, None);
        assert_eq!(twice, FilterState { status: None, ..state });
    }

    #[test]
    fn test_values_from_other_kind_are_rejected() {
        let start = FilterState::initial();
        let state = reconcile(&start, FilterPatch::SubType(SubType::Manga(MangaType::Manhwa)));
        assert_eq!(state, start);

        let manga = FilterState::for_kind(MediaKind::Manga);
        assert_eq!(reconcile(&manga, FilterPatch::ContentRating(ContentRating::R)), manga);
        assert_eq!(
            reconcile(&manga, FilterPatch::Status(Status::Anime(AnimeStatus::Airing))),
            manga
        );
    }

    #[test]
    fn test_build_params_for_search() {
        let params = build_query_params(Some("  bebop "), 2, &anime_filters());
        assert_eq!(
            params,
            vec![
                ("q", "bebop".to_string()),
                ("page", "2".to_string()),
                ("limit", "24".to_string()),
                ("type", "movie".to_string()),
                ("status", "airing".to_string()),
                ("rating", "pg13".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_params_skip_empty_fields() {
        let params = build_query_params(Some(""), 1, &FilterState::for_kind(MediaKind::Manga));
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("limit", "24".to_string())]
        );

        let params = build_query_params(None, 3, &FilterState::default());
        assert!(params.iter().all(|(key, _)| *key != "q"));
    }

    #[test]
    fn test_manga_params() {
        let filters = FilterState::for_kind(MediaKind::Manga)
            .apply(FilterPatch::SubType(SubType::Manga(MangaType::LightNovel)))
            .apply(FilterPatch::Status(Status::Manga(MangaStatus::Hiatus)));

        let params = build_query_params(None, 1, &filters);
        assert!(params.contains(&("type", "lightnovel".to_string())));
        assert!(params.contains(&("status", "hiatus".to_string())));
        assert!(params.iter().all(|(key, _)| *key != "rating"));
    }

    #[test]
    fn test_parse_user_values() {
        assert_eq!(
            SubType::parse(MediaKind::Anime, "TV"),
            Some(SubType::Anime(AnimeType::Tv))
        );
        assert_eq!(
            SubType::parse(MediaKind::Manga, "Light Novel"),
            Some(SubType::Manga(MangaType::LightNovel))
        );
        assert_eq!(SubType::parse(MediaKind::Anime, "manhwa"), None);
        assert_eq!(
            Status::parse(MediaKind::Anime, "completed"),
            Some(Status::Anime(AnimeStatus::Complete))
        );
        assert_eq!(
            Status::parse(MediaKind::Manga, "discontinued"),
            Some(Status::Manga(MangaStatus::Discontinued))
        );
        assert_eq!("PG-13".parse::<ContentRating>().unwrap(), ContentRating::Pg13);
        assert!("nc17".parse::<ContentRating>().is_err());
    }

    #[test]
    fn test_query_selects_listing_without_term() {
        let query = SearchQuery {
            term: "   ".to_string(),
            page: 1,
            filters: FilterState::default(),
        };
        assert!(!query.is_keyword_search());
        assert_eq!(query.kind(), MediaKind::Anime);
    }

    fn arb_kind() -> impl Strategy<Value = MediaKind> {
        prop_oneof![Just(MediaKind::Anime), Just(MediaKind::Manga)]
    }

    fn arb_patch() -> impl Strategy<Value = FilterPatch> {
        prop_oneof![
            Just(FilterPatch::Reset),
            arb_kind().prop_map(FilterPatch::MediaKind),
            prop::sample::select(AnimeType::ALL.to_vec())
                .prop_map(|t| FilterPatch::SubType(SubType::Anime(t))),
            prop::sample::select(MangaType::ALL.to_vec())
                .prop_map(|t| FilterPatch::SubType(SubType::Manga(t))),
            prop::sample::select(AnimeStatus::ALL.to_vec())
                .prop_map(|s| FilterPatch::Status(Status::Anime(s))),
            prop::sample::select(MangaStatus::ALL.to_vec())
                .prop_map(|s| FilterPatch::Status(Status::Manga(s))),
            prop::sample::select(ContentRating::ALL.to_vec()).prop_map(FilterPatch::ContentRating),
        ]
    }

    fn arb_state() -> impl Strategy<Value = FilterState> {
        prop::collection::vec(arb_patch(), 0..12).prop_map(|patches| {
            patches
                .into_iter()
                .fold(FilterState::default(), |state, patch| reconcile(&state, patch))
        })
    }

    proptest! {
        #[test]
        fn prop_fields_match_active_kind(state in arb_state()) {
            let kind = state.effective_kind();
            if kind == MediaKind::Manga {
                prop_assert!(state.content_rating.is_none());
            }
            if let Some(sub_type) = state.sub_type {
                prop_assert_eq!(sub_type.kind(), kind);
            }
            if let Some(status) = state.status {
                prop_assert_eq!(status.kind(), kind);
            }
        }

        #[test]
        fn prop_field_patch_twice_toggles_field(state in arb_state(), patch in arb_patch()) {
            let once = reconcile(&state, patch);
            let twice = reconcile(&once, patch);

            // Rejected patches leave the state alone both times
            if once == state {
                prop_assert_eq!(twice, state);
                return Ok(());
            }

            match patch {
                FilterPatch::SubType(v) => match state.sub_type {
                    Some(held) if held != v => {
                        prop_assert_eq!(twice, FilterState { sub_type: None, ..state });
                    }
                    _ => prop_assert_eq!(twice, state),
                },
                FilterPatch::Status(v) => match state.status {
                    Some(held) if held != v => {
                        prop_assert_eq!(twice, FilterState { status: None, ..state });
                    }
                    _ => prop_assert_eq!(twice, state),
                },
                FilterPatch::ContentRating(v) => match state.content_rating {
                    Some(held) if held != v => {
                        prop_assert_eq!(twice, FilterState { content_rating: None, ..state });
                    }
                    _ => prop_assert_eq!(twice, state),
                },
                FilterPatch::Reset => prop_assert_eq!(twice, FilterState::initial()),
                FilterPatch::MediaKind(kind) => prop_assert_eq!(twice.media_kind, Some(kind)),
            }
        }
    }
}
