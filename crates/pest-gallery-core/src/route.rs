//! Screen routing.

use pest_gallery_protocol::RecordId;
use std::fmt;

/// Screens reachable in the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    #[default]
    Gallery,
    /// `/pests/{id}`
    Detail(RecordId),
    /// `/about`
    About,
    /// `/contact`
    Contact,
}

impl Route {
    /// Resolve a path. Anything unrecognized lands on the gallery.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        let mut segments = trimmed.trim_start_matches('/').split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some("about"), None, _) => Route::About,
            (Some("contact"), None, _) => Route::Contact,
            (Some("pests"), Some(id), None) if !id.is_empty() => Route::Detail(RecordId::new(id)),
            _ => Route::Gallery,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Gallery => "/".to_string(),
            Route::Detail(id) => format!("/pests/{id}"),
            Route::About => "/about".to_string(),
            Route::Contact => "/contact".to_string(),
        }
    }

    /// Navigation label shown in the header.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Gallery => "Home",
            Route::Detail(_) => "Pest",
            Route::About => "About",
            Route::Contact => "Contact",
        }
    }

    /// Entries of the top navigation bar, in display order.
    pub const NAV: [Route; 3] = [Route::Gallery, Route::About, Route::Contact];
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Current route plus back history.
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Router {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Move to `route`, remembering where we came from.
    pub fn navigate(&mut self, route: Route) {
        if route == self.current {
            return;
        }
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous);
    }

    /// Return to the previous screen, or the gallery when history is empty.
    pub fn back(&mut self) -> &Route {
        self.current = self.history.pop().unwrap_or_default();
        &self.current
    }
}
