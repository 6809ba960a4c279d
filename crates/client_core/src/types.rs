//! View-state values shared by the selector and the controllers.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Category, MovieId},
    protocol::{CastMember, Credits, CrewMember, MovieDetails, MovieSummary},
};

/// Upstream refuses list and search pages past this one.
pub const MAX_UPSTREAM_PAGE: u32 = 500;
pub const TOP_CAST_LEN: usize = 5;
pub const DIRECTOR_JOB: &str = "Director";

/// Output of the selector: what the list should show, minus the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category: Category,
    pub search_text: String,
}

impl Selection {
    pub fn new(category: Category, search_text: impl Into<String>) -> Self {
        Self {
            category,
            search_text: search_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub category: Category,
    pub search_text: String,
    pub page: u32,
}

/// What the upstream is actually asked for once search precedence is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    Browse { category: Category, page: u32 },
    Search { text: String, page: u32 },
}

impl ListQuery {
    pub fn first_page(selection: &Selection) -> Self {
        Self {
            category: selection.category,
            search_text: selection.search_text.clone(),
            page: 1,
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.category, self.search_text.clone())
    }

    pub fn is_search(&self) -> bool {
        !self.search_text.trim().is_empty()
    }

    pub fn same_selection(&self, selection: &Selection) -> bool {
        self.category == selection.category && self.search_text == selection.search_text
    }

    pub fn resolve(&self) -> ListRequest {
        if self.is_search() {
            ListRequest::Search {
                text: self.search_text.trim().to_string(),
                page: self.page,
            }
        } else {
            ListRequest::Browse {
                category: self.category,
                page: self.page,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<MovieSummary>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for ListResult {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Director {
    Named(String),
    Unknown,
}

impl Director {
    /// First crew entry credited exactly as director, in upstream order.
    pub fn from_crew(crew: &[CrewMember]) -> Self {
        crew.iter()
            .find(|member| member.job == DIRECTOR_JOB)
            .map(|member| Director::Named(member.name.clone()))
            .unwrap_or(Director::Unknown)
    }
}

impl fmt::Display for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Director::Named(name) => f.write_str(name),
            Director::Unknown => f.write_str("Unknown"),
        }
    }
}

pub fn top_cast(cast: &[CastMember]) -> Vec<CastMember> {
    cast.iter().take(TOP_CAST_LEN).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub tagline: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub director: Director,
    pub top_cast: Vec<CastMember>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

impl DetailRecord {
    pub fn assemble(details: MovieDetails, credits: Credits) -> Self {
        let director = Director::from_crew(&credits.crew);
        let top_cast = top_cast(&credits.cast);
        Self {
            id: details.id,
            title: details.title,
            overview: details.overview,
            release_date: details.release_date.filter(|date| !date.is_empty()),
            poster_path: details.poster_path,
            tagline: details.tagline.filter(|tagline| !tagline.is_empty()),
            runtime_minutes: details.runtime.filter(|minutes| *minutes > 0),
            genres: details.genres.into_iter().map(|genre| genre.name).collect(),
            director,
            top_cast,
            cast: credits.cast,
            crew: credits.crew,
        }
    }
}
