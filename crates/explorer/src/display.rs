//! Terminal rendering of result lists, detail views, and page controls.

use crate::pagination::{PageControls, PageIndicator};
use crate::query::FilterState;
use crate::wishlist::Wishlist;
use shared::{MediaItem, MediaKind, ResultPage};
use std::fmt::Write;

const SAVED_MARK: &str = "♥";
const SYNOPSIS_WIDTH: usize = 78;

/// One line per item: wishlist mark, id, title, and a short summary
pub fn item_line(item: &MediaItem, saved: bool) -> String {
    let mark = if saved { SAVED_MARK } else { " " };
    let mut line = format!("{mark} {:>6}  {}", item.mal_id, item.title);

    let mut facts = Vec::new();
    if let Some(media_type) = &item.media_type {
        facts.push(media_type.clone());
    }
    if let Some(length) = item.length() {
        let unit = match item.kind() {
            MediaKind::Anime => "ep",
            MediaKind::Manga => "ch",
        };
        facts.push(format!("{length} {unit}"));
    }
    if let Some(score) = item.score {
        facts.push(format!("★ {score:.2}"));
    }
    if let Some(status) = &item.status {
        facts.push(status.clone());
    }

    if !facts.is_empty() {
        let _ = write!(line, " ({})", facts.join(", "));
    }
    line
}

/// The result list, or a "no results" line
pub fn results_block(results: &ResultPage, wishlist: &Wishlist) -> String {
    if results.is_empty() {
        return "No results.".to_string();
    }

    results
        .items
        .iter()
        .map(|item| item_line(item, wishlist.contains(item.mal_id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Page controls such as `‹ prev  1 … 4 [5] 6 … 9 10  next ›`
pub fn page_controls_line(controls: &PageControls) -> String {
    let pages = controls
        .window
        .iter()
        .map(|indicator| match indicator {
            PageIndicator::Page(page) if *page == controls.current => format!("[{page}]"),
            PageIndicator::Page(page) => page.to_string(),
            PageIndicator::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let previous = if controls.has_previous { "‹ prev" } else { "      " };
    let next = if controls.has_next { "next ›" } else { "" };
    format!("{previous}  {pages}  {next}").trim_end().to_string()
}

/// Active filters, e.g. `anime · type=tv · status=airing`
pub fn filter_summary(filters: &FilterState) -> String {
    let mut parts = vec![filters.effective_kind().to_string()];
    if let Some(sub_type) = filters.sub_type {
        parts.push(format!("type={}", sub_type.as_param()));
    }
    if let Some(status) = filters.status {
        parts.push(format!("status={}", status.as_param()));
    }
    if let Some(rating) = filters.content_rating {
        parts.push(format!("rating={rating}"));
    }
    parts.join(" · ")
}

/// Full detail view of one entry
pub fn detail_view(item: &MediaItem, saved: bool) -> String {
    let mut out = String::new();
    let kind = item.kind();

    let _ = writeln!(out, "{}", item.title);
    if let Some(english) = item.title_english.as_deref().filter(|t| *t != item.title) {
        let _ = writeln!(out, "{english}");
    }
    if let Some(japanese) = &item.title_japanese {
        let _ = writeln!(out, "{japanese}");
    }
    let _ = writeln!(out);

    let length_label = match kind {
        MediaKind::Anime => "Episodes",
        MediaKind::Manga => "Chapters",
    };
    let fields = [
        ("Type", item.media_type.clone()),
        ("Status", item.status.clone()),
        ("Score", item.score.map(|s| format!("{s:.2}"))),
        (length_label, item.length().map(|n| n.to_string())),
        ("Year", item.year.map(|y| y.to_string())),
    ];
    for (label, value) in fields {
        let _ = writeln!(out, "{label:<10}{}", value.as_deref().unwrap_or("-"));
    }

    if !item.genres.is_empty() {
        let genres: Vec<&str> = item.genres.iter().map(|g| g.name.as_str()).collect();
        let _ = writeln!(out, "{:<10}{}", "Genres", genres.join(", "));
    }

    let creators_label = match kind {
        MediaKind::Anime => "Studios",
        MediaKind::Manga => "Publishers",
    };
    if !item.creators().is_empty() {
        let names: Vec<&str> = item.creators().iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "{creators_label:<10}{}", names.join(", "));
    }

    if let Some(synopsis) = &item.synopsis {
        let _ = writeln!(out);
        for line in wrap(synopsis, SYNOPSIS_WIDTH) {
            let _ = writeln!(out, "{line}");
        }
    }

    let _ = writeln!(out);
    if let Some(trailer) = item.trailer.as_ref().and_then(|t| t.url.as_deref()) {
        let _ = writeln!(out, "Trailer   {trailer}");
    }
    if let Some(cover) = item.cover_url() {
        let _ = writeln!(out, "Cover     {cover}");
    }
    let _ = writeln!(out, "Link      {}", item.url);
    let _ = write!(
        out,
        "{}",
        if saved { "♥ In your wishlist" } else { "Not in your wishlist" }
    );

    out
}

/// Wishlist grouped by partition
pub fn wishlist_block(wishlist: &Wishlist, only: Option<MediaKind>) -> String {
    let kinds: Vec<MediaKind> = match only {
        Some(kind) => vec![kind],
        None => MediaKind::ALL.to_vec(),
    };

    let mut out = String::new();
    for kind in kinds {
        let items = wishlist.partition(kind);
        let _ = writeln!(out, "{} wishlist ({})", capitalize(kind.as_str()), items.len());
        if items.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for item in items {
            let _ = writeln!(out, "{}", item_line(item, true));
        }
    }
    out.trim_end().to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Greedy word wrap
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}
