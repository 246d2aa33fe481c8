//! Navigation: top-level tabs and typed routes.

use lantern_core::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Stories,
    Weather,
    Counter,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Stories => "Stories",
            View::Weather => "Weather",
            View::Counter => "Counter",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Stories, View::Weather, View::Counter]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}

/// A dashboard location, as typed into the command line (`:story/8863`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Stories,
    Story(ItemId),
    /// `story/{id}` where the id is not numeric. Rendered without fetching.
    InvalidStory(String),
    Weather,
    Counter,
}

impl Route {
    /// Parse a path such as `/`, `/story/8863`, `weather` or `/counter`.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim().trim_matches('/');
        match path.split_once('/') {
            Some(("story", raw)) => Some(
                raw.parse::<ItemId>()
                    .map(Route::Story)
                    .unwrap_or_else(|_| Route::InvalidStory(raw.to_string())),
            ),
            Some(_) => None,
            None => match path {
                "" | "stories" => Some(Route::Stories),
                "weather" => Some(Route::Weather),
                "counter" => Some(Route::Counter),
                _ => None,
            },
        }
    }

    /// The tab this route lives under.
    pub fn view(&self) -> View {
        match self {
            Route::Stories | Route::Story(_) | Route::InvalidStory(_) => View::Stories,
            Route::Weather => View::Weather,
            Route::Counter => View::Counter,
        }
    }
}
