//! Snapshot tests: render_markdown, build_view output regression detection.

mod common;

use common::standard_books;
use insta::{assert_json_snapshot, assert_snapshot};

use bookshelf_mcp::application::view::ShelfRenderer;
use bookshelf_mcp::domain::model::book::Book;
use bookshelf_mcp::domain::model::shelf::Shelf;

fn standard_shelf() -> Shelf {
    Shelf::from_books(standard_books()).unwrap()
}

// =============================================================================
// Markdown snapshots
// =============================================================================

#[test]
fn snapshot_markdown_full() {
    let shelf = standard_shelf();
    let books: Vec<&Book> = shelf.books().iter().collect();
    let md = ShelfRenderer::render_markdown(&books, None);
    assert_snapshot!("markdown_full", md);
}

#[test]
fn snapshot_markdown_search() {
    let shelf = standard_shelf();
    let hits = shelf.search("dune");
    let md = ShelfRenderer::render_markdown(&hits, Some("dune"));
    assert_snapshot!("markdown_search_dune", md);
}

// =============================================================================
// JSON snapshots
// =============================================================================

#[test]
fn snapshot_json_full() {
    let shelf = standard_shelf();
    let books: Vec<&Book> = shelf.books().iter().collect();
    let view = ShelfRenderer::build_view(&books, None);
    assert_json_snapshot!("json_full", view);
}
