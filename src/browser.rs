use reqwest::Client;
use std::io;
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::PageQuery;
use crate::query::{QueryEngine, ViewMode};
use crate::render::Presenter;
use crate::scrapers::DealFeed;
use crate::store::DealStore;

/// User actions of the browsing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Page(u32),
    Size(u32),
    Mode(ViewMode),
    Refresh,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().ok_or("empty command")?.to_lowercase();
        let arg = parts.next();

        let number = |arg: Option<&str>| -> Result<u32, String> {
            arg.ok_or_else(|| format!("'{}' needs a number", verb))?
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("'{}' needs a positive number", verb))
        };

        match verb.as_str() {
            "page" | "p" => Ok(Command::Page(number(arg)?)),
            "size" | "show" => Ok(Command::Size(number(arg)?)),
            "mode" | "sort" | "filter" => {
                let mode = arg.ok_or_else(|| format!("'{}' needs a mode", verb))?;
                Ok(Command::Mode(mode.parse()?))
            }
            "refresh" | "r" => Ok(Command::Refresh),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// Owns the store and drives it from user actions: page and size changes
/// refetch and reload, mode changes only re-derive a view from the snapshot.
pub struct Browser<P: Presenter> {
    client: Client,
    feed: Box<dyn DealFeed>,
    store: DealStore,
    engine: QueryEngine,
    presenter: P,
    page_size: u32,
    mode: ViewMode,
}

impl<P: Presenter> Browser<P> {
    pub fn new(
        client: Client,
        feed: Box<dyn DealFeed>,
        engine: QueryEngine,
        presenter: P,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            feed,
            store: DealStore::new(),
            engine,
            presenter,
            page_size: page_size.max(1),
            mode: ViewMode::default(),
        }
    }

    pub fn store(&self) -> &DealStore {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Initial load of page 1. Returns whether the fetch succeeded.
    pub async fn start(&mut self) -> io::Result<bool> {
        info!("Browsing {}", self.feed.name());
        self.reload(PageQuery::new(1, self.page_size)).await
    }

    pub async fn on_page_change(&mut self, page: u32) -> io::Result<bool> {
        self.reload(PageQuery::new(page, self.page_size)).await
    }

    pub async fn on_page_size_change(&mut self, size: u32) -> io::Result<bool> {
        self.page_size = size.max(1);
        let page = self.store.snapshot().meta.current_page;
        self.reload(PageQuery::new(page, self.page_size)).await
    }

    /// Switch the active filter/sort and redraw from the current snapshot.
    pub fn on_mode_change(&mut self, mode: ViewMode) -> io::Result<()> {
        self.mode = mode;
        let snapshot = self.store.snapshot();
        let view = self.engine.apply(&snapshot.deals, mode);
        self.presenter.render_view(&view, &snapshot.meta)
    }

    pub async fn refresh(&mut self) -> io::Result<bool> {
        let page = self.store.snapshot().meta.current_page;
        self.reload(PageQuery::new(page, self.page_size)).await
    }

    /// Apply one command. `Ok(false)` means the user asked to quit.
    pub async fn execute(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Page(page) => self.on_page_change(page).await?,
            Command::Size(size) => self.on_page_size_change(size).await?,
            Command::Mode(mode) => {
                self.on_mode_change(mode)?;
                true
            }
            Command::Refresh => self.refresh().await?,
            Command::Quit => return Ok(false),
        };
        Ok(true)
    }

    async fn reload(&mut self, query: PageQuery) -> io::Result<bool> {
        match self.feed.fetch_page(&self.client, query).await {
            Ok(page) => {
                self.store.load(page.deals, page.meta);
                self.render_loaded()?;
                Ok(true)
            }
            Err(e) => {
                warn!("Keeping previous deals, fetch failed: {}", e);
                self.presenter.render_stale(&e)?;
                self.render_loaded()?;
                Ok(false)
            }
        }
    }

    // A load invalidates any earlier view, so the active mode is derived anew.
    fn render_loaded(&mut self) -> io::Result<()> {
        let snapshot = self.store.snapshot();
        if self.mode.is_identity() {
            self.presenter.render(&snapshot.deals, &snapshot.meta)
        } else {
            let view = self.engine.apply(&snapshot.deals, self.mode);
            self.presenter.render_view(&view, &snapshot.meta)
        }
    }
}
