//! Static catalog provider.
//!
//! The catalog is a read-only dataset bundled into the binary: an ordered
//! book list plus author and genre lookup tables. Nothing here mutates
//! after load.

use std::collections::HashSet;

use anyhow::Context as _;
use bookstand_core::BookRecord;
use serde::{Deserialize, Serialize};

const EMBEDDED_CATALOG: &str = include_str!("../data/books.json");

/// Previews shown per page of results.
pub const PAGE_SIZE: usize = 12;

/// One row of an id -> display name table. Table order is selector order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    authors: Vec<NamedEntry>,
    genres: Vec<NamedEntry>,
    books: Vec<BookRecord>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    books: Vec<BookRecord>,
    authors: Vec<NamedEntry>,
    genres: Vec<NamedEntry>,
    page_size: usize,
}

impl Catalog {
    /// Loads the dataset shipped with the binary.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_json(EMBEDDED_CATALOG).context("load embedded catalog")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let data: CatalogData = serde_json::from_str(json).context("parse catalog json")?;
        Self::new(data.books, data.authors, data.genres, PAGE_SIZE)
    }

    pub fn new(
        books: Vec<BookRecord>,
        authors: Vec<NamedEntry>,
        genres: Vec<NamedEntry>,
        page_size: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(page_size > 0, "page size must be positive");

        let mut seen = HashSet::new();
        for book in &books {
            anyhow::ensure!(!seen.contains(&book.id), "duplicate book id {}", book.id);
            seen.insert(book.id.clone());
        }

        Ok(Self {
            books,
            authors,
            genres,
            page_size,
        })
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn authors(&self) -> &[NamedEntry] {
        &self.authors
    }

    pub fn genres(&self) -> &[NamedEntry] {
        &self.genres
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn book(&self, index: usize) -> Option<&BookRecord> {
        self.books.get(index)
    }

    /// Linear scan over the full catalog, not just current matches.
    pub fn book_by_id(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Missing ids resolve to `None`; callers render a blank name.
    pub fn author_name(&self, id: &str) -> Option<&str> {
        lookup(&self.authors, id)
    }

    pub fn genre_name(&self, id: &str) -> Option<&str> {
        lookup(&self.genres, id)
    }
}

fn lookup<'a>(entries: &'a [NamedEntry], id: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.name.as_str())
}
