//! Test helpers and fixtures.

use bookstand_application::BrowserContext;
use bookstand_catalog::{Catalog, NamedEntry};
use bookstand_core::{BookRecord, Settings, Theme};

/// Synthetic catalog of `n` books cycling over three authors and two genres.
pub fn make_catalog(n: usize, page_size: usize) -> Catalog {
    let authors = vec![
        entry("a0", "Ada Zero"),
        entry("a1", "Bob One"),
        entry("a2", "Cid Two"),
    ];
    let genres = vec![entry("g0", "Gears"), entry("g1", "Ghosts")];

    let books = (0..n)
        .map(|i| BookRecord {
            id: format!("b{i}"),
            title: format!("Book {i}"),
            author: format!("a{}", i % 3),
            image: format!("https://covers.invalid/b{i}.jpg"),
            description: format!("Synopsis of book {i}."),
            published: format!("{}-01-01", 1900 + i),
            genres: vec![format!("g{}", i % 2)],
        })
        .collect();

    Catalog::new(books, authors, genres, page_size).expect("fixture catalog is well-formed")
}

pub fn make_settings(theme: Theme) -> Settings {
    Settings { theme }
}

/// Context seeded with the identity match set over `catalog`, page 1.
pub fn make_context(catalog: &Catalog, theme: Theme) -> BrowserContext {
    let mut ctx = BrowserContext::new(make_settings(theme), catalog.page_size());
    ctx.reset_and_apply(
        bookstand_core::FilterCriteria::default(),
        (0..catalog.books().len()).collect(),
    );
    ctx
}

fn entry(id: &str, name: &str) -> NamedEntry {
    NamedEntry {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_catalog() {
        let catalog = make_catalog(5, 12);
        assert_eq!(catalog.books().len(), 5);
        assert_eq!(catalog.author_name("a1"), Some("Bob One"));
    }

    #[test]
    fn builds_context_on_page_one() {
        let catalog = make_catalog(25, 12);
        let ctx = make_context(&catalog, Theme::Day);
        assert_eq!(ctx.page, 1);
        assert_eq!(ctx.visible_count(), 12);
    }
}
