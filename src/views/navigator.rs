use super::{Page, Route};
use crate::app::App;

/// Keeps track of the current page and the history.
///
/// The cached results of a page are invalidated when the
/// user navigates away, so returning to it fetches again.
pub struct Navigator<'a> {
    app: &'a App,
    history: Vec<Route>,
    page: Option<Page>,
}

impl<'a> Navigator<'a> {
    pub fn new(app: &'a App) -> Self {
        // Results of start-up queries outlive every page
        let _ = app.catalog.take_touched();
        Self {
            app,
            history: vec![],
            page: None,
        }
    }

    pub fn current(&self) -> Option<&Route> {
        self.history.last()
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    pub async fn open(&mut self, route: Route) -> &Page {
        self.history.push(route);
        self.show().await
    }

    /// Return to the previous page, if any.
    pub async fn back(&mut self) -> Option<&Page> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        Some(self.show().await)
    }

    /// Load the current page again with fresh data.
    pub async fn reload(&mut self) -> Option<&Page> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.show().await)
    }

    async fn show(&mut self) -> &Page {
        let stale = self.app.catalog.take_touched();
        log::debug!("Invalidating {} queries", stale.len());
        self.app.catalog.invalidate_all(&stale);
        // Not empty after open, back or reload
        let route = self.history.last().cloned().unwrap_or(Route::Home);
        let page = Page::load(self.app, &route).await;
        self.page.insert(page)
    }
}
