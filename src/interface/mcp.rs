//! MCP Server for bookshelf-mcp
//!
//! MCP Protocol (stdio) <-> application::BookStore / ShelfRenderer
//!
//! 9 tools: book_submit, book_edit, book_cancel_edit, book_update, book_delete,
//! book_toggle, book_get, book_search, shelf

use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::application::error::AppError;
use crate::application::service::{BookStore, Submission};
use crate::application::view::{ShelfRenderer, ViewFormat};
use crate::config::Config;
use crate::domain::model::book::{parse_year, BookDraft};
use crate::domain::model::id::BookId;
use crate::domain::model::shelf::Outcome;
use crate::infra::json_store::JsonShelfRepository;

type Store = BookStore<JsonShelfRepository>;

// =============================================================================
// Public entry point
// =============================================================================

/// 本棚を読み込んでMCP Serverを起動する。
pub async fn run(config: Config) -> anyhow::Result<()> {
    let repo = JsonShelfRepository::new(&config.storage_path);
    let store = BookStore::open(repo).inspect_err(|e| {
        error!(path = %config.storage_path.display(), error = %e, "failed to open bookshelf");
    })?;
    info!(path = %config.storage_path.display(), "bookshelf MCP server starting");

    let server = BookshelfMcpServer::new(store);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BookshelfMcpServer {
    store: Arc<Mutex<Store>>,
    tool_router: ToolRouter<Self>,
}

impl BookshelfMcpServer {
    fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            tool_router: Self::tool_router(),
        }
    }

    /// 唯一の書き手としてStoreを借りる。
    fn store(&self) -> Result<MutexGuard<'_, Store>, McpError> {
        self.store
            .lock()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    fn to_mcp_error(e: AppError) -> McpError {
        McpError::internal_error(format!("{e}"), None)
    }

    fn text(s: impl Into<String>) -> CallToolResult {
        CallToolResult::success(vec![Content::text(s.into())])
    }

    fn not_found(id: BookId) -> CallToolResult {
        Self::text(format!(
            "No book with id {id}. Nothing changed. Use `shelf` to see current ids."
        ))
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BookshelfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bookshelf-mcp".to_string(),
                title: Some("Bookshelf MCP: Personal Library Tracker".to_string()),
                description: Some(
                    "Track books on two shelves (unread / finished). \
                     Add, edit, delete, search and mark books as read."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a personal bookshelf.\n\
                 \n\
                 `shelf` shows all books with their ids. `book_submit` adds a book \
                 (or saves the book opened with `book_edit`). `book_toggle` moves a book \
                 between the unread and finished shelves. `book_search` filters by title."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

/// 年の入力。数値でも文字列でも受け付け、文字列は先頭の整数部分を読む。
/// 小数は切り捨て、範囲外の数は不明扱い。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
enum YearInput {
    Number(i64),
    Float(f64),
    Text(String),
}

impl YearInput {
    fn to_year(&self) -> Option<i32> {
        match self {
            YearInput::Number(n) => i32::try_from(*n).ok(),
            YearInput::Float(f) => {
                let t = f.trunc();
                (t.is_finite() && t >= f64::from(i32::MIN) && t <= f64::from(i32::MAX))
                    .then_some(t as i32)
            }
            YearInput::Text(s) => parse_year(s),
        }
    }
}

fn parse_format(s: Option<&str>) -> Result<ViewFormat, McpError> {
    match s {
        Some("markdown") | None => Ok(ViewFormat::Markdown),
        Some("json") => Ok(ViewFormat::Json),
        Some(other) => Err(McpError::invalid_params(
            format!("Unknown format: '{other}'. Use: markdown, json"),
            None,
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookFormRequest {
    #[schemars(description = "Book title")]
    pub title: String,
    #[schemars(description = "Author name")]
    #[serde(default)]
    pub author: String,
    #[schemars(
        description = "Publication year (number or text). Text that does not start with a number is stored as unknown."
    )]
    pub year: Option<YearInput>,
    #[schemars(description = "Already finished reading (default: false)")]
    #[serde(default)]
    pub is_complete: bool,
}

impl McpBookFormRequest {
    fn into_draft(self) -> BookDraft {
        let year = self.year.as_ref().and_then(YearInput::to_year);
        BookDraft::new(self.title, self.author, year, self.is_complete)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookUpdateRequest {
    #[schemars(description = "Book id from `shelf` output")]
    pub book_id: i64,
    #[schemars(description = "New title")]
    pub title: String,
    #[schemars(description = "New author")]
    #[serde(default)]
    pub author: String,
    #[schemars(description = "New year (number or text)")]
    pub year: Option<YearInput>,
    #[schemars(description = "Finished reading")]
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookIdRequest {
    #[schemars(description = "Book id from `shelf` output")]
    pub book_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSearchRequest {
    #[schemars(description = "Part of the title (case-insensitive). Empty shows every book.")]
    #[serde(default)]
    pub query: String,
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpShelfRequest {
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpCancelEditRequest {}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BookshelfMcpServer {
    #[tool(
        name = "book_submit",
        description = "Submit the book form. Adds a new book, or saves the book currently opened with `book_edit`.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_submit(
        &self,
        Parameters(req): Parameters<McpBookFormRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut store = self.store()?;
        let submission = store.submit(req.into_draft()).map_err(Self::to_mcp_error)?;

        let message = match submission {
            Submission::Created(book) => {
                format!("Added: {}", ShelfRenderer::render_line(&book))
            }
            Submission::Updated {
                id,
                outcome: Outcome::Applied,
            } => match store.find_by_id(id) {
                Some(book) => format!("Updated: {}", ShelfRenderer::render_line(book)),
                None => format!("Updated book {id}"),
            },
            Submission::Updated {
                id,
                outcome: Outcome::NotFound,
            } => format!("Book {id} no longer exists. Nothing was updated."),
        };
        Ok(Self::text(message))
    }

    #[tool(
        name = "book_edit",
        description = "Open a book for editing. Shows its current values; the next `book_submit` overwrites them.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_edit(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BookId::from(req.book_id);
        let mut store = self.store()?;
        let Some(book) = store.begin_edit(id) else {
            return Ok(Self::not_found(id));
        };

        let year = book
            .year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self::text(format!(
            "Editing book {id}\n\
             title: {}\n\
             author: {}\n\
             year: {year}\n\
             is_complete: {}\n\
             \n\
             Call `book_submit` with the new values to save, or `book_cancel_edit`.",
            book.title(),
            book.author(),
            book.is_complete()
        )))
    }

    #[tool(
        name = "book_cancel_edit",
        description = "Leave edit mode. The next `book_submit` adds a new book.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_cancel_edit(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpCancelEditRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut store = self.store()?;
        let message = match store.editing() {
            Some(id) => format!("Stopped editing book {id}."),
            None => "Not editing any book.".to_string(),
        };
        store.cancel_edit();
        Ok(Self::text(message))
    }

    #[tool(
        name = "book_update",
        description = "Overwrite title, author, year and completion of a book by id.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_update(
        &self,
        Parameters(req): Parameters<McpBookUpdateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BookId::from(req.book_id);
        let year = req.year.as_ref().and_then(YearInput::to_year);
        let draft = BookDraft::new(req.title, req.author, year, req.is_complete);

        let mut store = self.store()?;
        match store.update(id, draft).map_err(Self::to_mcp_error)? {
            Outcome::Applied => match store.find_by_id(id) {
                Some(book) => Ok(Self::text(format!(
                    "Updated: {}",
                    ShelfRenderer::render_line(book)
                ))),
                None => Ok(Self::text(format!("Updated book {id}"))),
            },
            Outcome::NotFound => Ok(Self::not_found(id)),
        }
    }

    #[tool(
        name = "book_delete",
        description = "Remove a book from the shelf by id.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_delete(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BookId::from(req.book_id);
        let mut store = self.store()?;
        match store.delete(id).map_err(Self::to_mcp_error)? {
            Outcome::Applied => Ok(Self::text(format!("Deleted book {id}."))),
            Outcome::NotFound => Ok(Self::not_found(id)),
        }
    }

    #[tool(
        name = "book_toggle",
        description = "Move a book between the unread and finished shelves.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_toggle(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BookId::from(req.book_id);
        let mut store = self.store()?;
        match store.toggle_complete(id).map_err(Self::to_mcp_error)? {
            Outcome::Applied => {
                let shelf = match store.find_by_id(id) {
                    Some(book) if book.is_complete() => "finished",
                    _ => "unread",
                };
                Ok(Self::text(format!("Moved book {id} to {shelf}.")))
            }
            Outcome::NotFound => Ok(Self::not_found(id)),
        }
    }

    #[tool(
        name = "book_get",
        description = "Show a single book by id.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_get(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BookId::from(req.book_id);
        let store = self.store()?;
        match store.find_by_id(id) {
            Some(book) => Ok(Self::text(ShelfRenderer::render_line(book))),
            None => Ok(Self::not_found(id)),
        }
    }

    #[tool(
        name = "book_search",
        description = "Find books whose title contains the query (case-insensitive). Results keep shelf order.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_search(
        &self,
        Parameters(req): Parameters<McpSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let format = parse_format(req.format.as_deref())?;
        let store = self.store()?;
        let hits = store.search(&req.query);
        let output = ShelfRenderer::render(&hits, Some(req.query.as_str()), format)
            .map_err(Self::to_mcp_error)?;
        Ok(Self::text(output))
    }

    #[tool(
        name = "shelf",
        description = "Show every book, split into the unread and finished shelves, with ids.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn shelf(
        &self,
        Parameters(req): Parameters<McpShelfRequest>,
    ) -> Result<CallToolResult, McpError> {
        let format = parse_format(req.format.as_deref())?;
        let store = self.store()?;
        let books: Vec<_> = store.books().iter().collect();
        let output =
            ShelfRenderer::render(&books, None, format).map_err(Self::to_mcp_error)?;
        Ok(Self::text(output))
    }
}
