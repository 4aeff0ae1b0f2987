//! Database layer for the task manager.

pub mod comments;
mod named;
pub mod positions;
pub mod sessions;
pub mod stats;
pub mod task_types;
pub mod tasks;
pub mod workers;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL so list pages can read while a form submission writes
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;
        register_functions(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        register_functions(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            embedded::migrations::runner().run(conn)?;
            Ok(())
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&mut conn)
    }
}

/// Install `casefold(text)`, a full Unicode lowercase. SQLite's own `LIKE`
/// and `lower()` only fold ASCII letters.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lowercase `needle` and escape `%`, `_` and the escape character itself for
/// a `casefold(column) LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Which page of a list to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(i64),
    Last,
}

impl PageSelector {
    /// Parse the `page` query parameter. A missing or empty value means page 1;
    /// anything other than a positive integer or `last` is rejected.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(PageSelector::Number(1)),
            Some("last") => Some(PageSelector::Last),
            Some(n) => n.parse::<i64>().ok().map(PageSelector::Number),
        }
    }
}

/// Page selection plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: PageSelector,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: PageSelector, per_page: i64) -> Self {
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    /// Resolve against a row count. Returns `None` when the page is out of range.
    /// An empty list still has a valid first page.
    pub fn resolve(&self, total: i64) -> Option<PageWindow> {
        let total_pages = ((total + self.per_page - 1) / self.per_page).max(1);
        let page = match self.page {
            PageSelector::Last => total_pages,
            PageSelector::Number(n) => n,
        };
        if page < 1 || page > total_pages {
            return None;
        }
        Some(PageWindow {
            page,
            total_pages,
            limit: self.per_page,
            offset: (page - 1) * self.per_page,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(PageSelector::Number(1), 10)
    }
}

/// A resolved page: which rows to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

/// One page of results with pagination info.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, total: i64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            page: window.page,
            per_page: window.limit,
            total_pages: window.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based index of the first item on this page (0 when empty).
    pub fn start_index(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    pub fn end_index(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            self.start_index() - 1 + self.items.len() as i64
        }
    }
}
