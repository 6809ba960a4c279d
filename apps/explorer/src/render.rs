//! Plain-text rendering of list and detail snapshots.

use std::fmt::Write as _;

use chrono::NaiveDate;
use client_core::{DetailSnapshot, DetailView, ListSnapshot};

use crate::config::Settings;

#[derive(Debug, Clone)]
pub struct ImageLinks {
    pub base_url: String,
    pub placeholder_url: String,
}

impl ImageLinks {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.image_base_url.trim_end_matches('/').to_string(),
            placeholder_url: settings.placeholder_image_url.clone(),
        }
    }

    pub fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path.filter(|path| !path.is_empty()) {
            Some(path) if path.starts_with('/') => format!("{}{path}", self.base_url),
            Some(path) => format!("{}/{path}", self.base_url),
            None => self.placeholder_url.clone(),
        }
    }
}

/// `1999-03-31` → `March 31, 1999`; anything unparsable yields `fallback`.
pub fn format_release_date(date: Option<&str>, fallback: &str) -> String {
    date.and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn render_list(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", snapshot.heading());

    if snapshot.loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }
    if snapshot.failed {
        let _ = writeln!(out, "(could not refresh; showing last results)");
    }

    for movie in snapshot.visible_items() {
        let _ = writeln!(
            out,
            "[{}] {} - Release: {}",
            movie.id,
            movie.title,
            format_release_date(movie.release_date.as_deref(), "N/A")
        );
    }

    if snapshot.is_empty_search() {
        let _ = writeln!(out, "No results found.");
    }

    if snapshot.shows_pagination() {
        let previous = if snapshot.has_previous() { "[prev]" } else { " prev " };
        let next = if snapshot.has_next() { "[next]" } else { " next " };
        let _ = writeln!(out, "{previous}  {}  {next}", snapshot.page_label());
    }
    out
}

pub fn render_detail(snapshot: &DetailSnapshot, images: &ImageLinks) -> String {
    let mut out = String::new();
    match &snapshot.view {
        DetailView::Idle => {}
        DetailView::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        DetailView::NotFound => {
            let _ = writeln!(out, "No movie details found.");
        }
        DetailView::Loaded(record) => {
            let _ = writeln!(out, "== {} ==", record.title);
            if let Some(tagline) = &record.tagline {
                let _ = writeln!(out, "\"{tagline}\"");
            }
            let _ = writeln!(
                out,
                "Release Date: {}",
                format_release_date(record.release_date.as_deref(), "Unknown")
            );
            if let Some(minutes) = record.runtime_minutes {
                let _ = writeln!(out, "Runtime: {}h {:02}m", minutes / 60, minutes % 60);
            }
            if !record.genres.is_empty() {
                let _ = writeln!(out, "Genres: {}", record.genres.join(", "));
            }
            let _ = writeln!(out, "Poster: {}", images.poster_url(record.poster_path.as_deref()));
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", record.overview);
            let _ = writeln!(out);
            let _ = writeln!(out, "Director: {}", record.director);
            let _ = writeln!(out, "Main Cast");
            for actor in &record.top_cast {
                let _ = writeln!(out, "  - {} as {}", actor.name, actor.character);
            }
        }
    }
    out
}
