use shared::domain::Category;

use crate::types::Selection;

/// Current category and free-text search. Non-empty search text overrides the
/// category for listing purposes but does not replace it.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    category: Category,
    search_text: String,
}

impl Selector {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            search_text: String::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.category, self.search_text.clone())
    }

    pub fn select_category(&mut self, category: Category) -> Selection {
        self.category = category;
        self.search_text.clear();
        self.selection()
    }

    pub fn set_search_text(&mut self, text: &str) -> Selection {
        self.search_text = text.trim().to_string();
        self.selection()
    }

    /// Home state: default category, no search.
    pub fn reset(&mut self) -> Selection {
        self.select_category(Category::default())
    }
}
