pub mod format;

use std::io::{self, Write};

use crate::error::DealError;
use crate::models::{Deal, PaginationMeta};
use crate::query::DerivedView;
use format::{format_deal, format_pagination};

pub const NO_MATCHES: &str = "No deals corresponding to your filter";

/// View side of the browser. Every call redraws the whole state, so calling
/// one twice with the same input produces the same output.
pub trait Presenter {
    /// Loaded snapshot; the count indicator shows `meta.count`.
    fn render(&mut self, deals: &[Deal], meta: &PaginationMeta) -> io::Result<()>;

    /// A filter or sort result; the count indicator shows the view's length.
    fn render_view(&mut self, view: &DerivedView, meta: &PaginationMeta) -> io::Result<()>;

    /// A fetch failed and the last good state stays as it was.
    fn render_stale(&mut self, error: &DealError) -> io::Result<()>;
}

pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_deals(&mut self, heading: &str, deals: &[Deal]) -> io::Result<()> {
        writeln!(self.out, "== {} ==", heading)?;
        for deal in deals {
            writeln!(self.out, "{}", format_deal(deal))?;
        }
        Ok(())
    }

    fn write_footer(&mut self, meta: &PaginationMeta, count: usize) -> io::Result<()> {
        writeln!(self.out, "{} | Deals: {}", format_pagination(meta), count)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn render(&mut self, deals: &[Deal], meta: &PaginationMeta) -> io::Result<()> {
        self.write_deals("Deals", deals)?;
        self.write_footer(meta, meta.count)
    }

    fn render_view(&mut self, view: &DerivedView, meta: &PaginationMeta) -> io::Result<()> {
        if view.is_empty() {
            writeln!(self.out, "== Deals ({}) ==", view.mode)?;
            writeln!(self.out, "{}", NO_MATCHES)?;
        } else {
            self.write_deals(&format!("Deals ({})", view.mode), &view.deals)?;
        }
        self.write_footer(meta, view.count())
    }

    fn render_stale(&mut self, error: &DealError) -> io::Result<()> {
        writeln!(self.out, "!! Could not refresh deals ({}); showing previous results", error)?;
        self.out.flush()
    }
}
