//! Search and pagination over the post index.
//!
//! List state lives entirely in the URL: `page` and `search` query
//! parameters. [`ListQuery::from_params`] normalizes whatever the client
//! sent, and [`ListQuery::canonical_query`] renders the one query string
//! that represents a given state, so handlers can redirect when the two
//! disagree.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::models::BlogRoute;

pub const PAGE_PARAM: &str = "page";
pub const SEARCH_PARAM: &str = "search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub search: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
        }
    }
}

impl ListQuery {
    /// Missing, non-numeric or zero pages become 1; the search is trimmed.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let page = params
            .get(PAGE_PARAM)
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let search = params
            .get(SEARCH_PARAM)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        Self { page, search }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page,
            search: self.search.clone(),
        }
    }

    /// Query string without the leading `?`. Page 1 and an empty search are omitted.
    pub fn canonical_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            serializer.append_pair(SEARCH_PARAM, &self.search);
        }
        if self.page > 1 {
            serializer.append_pair(PAGE_PARAM, &self.page.to_string());
        }
        serializer.finish()
    }

    /// True when the raw query string (without `?`) is exactly the
    /// canonical spelling of this state. Repeated or unknown keys fail.
    pub fn is_canonical(&self, raw_query: Option<&str>) -> bool {
        raw_query.unwrap_or("") == self.canonical_query()
    }
}

/// How pager links are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// `/blog?search=x&page=2`, served dynamically.
    Query,
    /// `/blog/page/2/`, pre-rendered; search is not available.
    Static,
}

impl LinkStyle {
    pub fn href(self, query: &ListQuery) -> String {
        match self {
            LinkStyle::Query => {
                let qs = query.canonical_query();
                if qs.is_empty() {
                    "/blog".to_string()
                } else {
                    format!("/blog?{qs}")
                }
            }
            LinkStyle::Static if query.page <= 1 => "/blog/".to_string(),
            LinkStyle::Static => format!("/blog/page/{}/", query.page),
        }
    }
}

/// Case-insensitive; every whitespace separated term has to appear in the
/// title, description or id. An empty search keeps everything.
pub fn filter_routes<'a>(routes: &'a [BlogRoute], search: &str) -> Vec<&'a BlogRoute> {
    let terms: Vec<String> = search
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if terms.is_empty() {
        return routes.iter().collect();
    }
    routes
        .iter()
        .filter(|route| {
            let haystack = format!(
                "{}\n{}\n{}",
                route.title.to_lowercase(),
                route.description.to_lowercase(),
                route.id.to_lowercase()
            );
            terms.iter().all(|term| haystack.contains(term.as_str()))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Clamps `page` into `1..=total_pages` and returns that slice.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

/// Result of running a request through the list pipeline.
#[derive(Debug, Clone)]
pub struct Listing<'a> {
    pub query: ListQuery,
    pub page: Page<&'a BlogRoute>,
}

/// Filters, paginates, and returns the state that is actually shown
/// (the page may have been clamped).
pub fn list<'a>(routes: &'a [BlogRoute], requested: &ListQuery, page_size: usize) -> Listing<'a> {
    let matching = filter_routes(routes, &requested.search);
    let page = paginate(&matching, requested.page, page_size);
    Listing {
        query: requested.with_page(page.page),
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, title: &str, description: &str) -> BlogRoute {
        BlogRoute {
            route: format!("/posts/{id}"),
            id: id.to_string(),
            title: title.to_string(),
            date: None,
            description: description.to_string(),
            picture: None,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> Vec<BlogRoute> {
        vec![
            route("angular-signals", "Angular Signals", "Reactive state without zones"),
            route("rust-ownership", "Rust Ownership", "Borrowing explained"),
            route("static-sites", "Static Sites", "Pre-rendering with Scully"),
            route("rust-async", "Async Rust", "Futures and tokio"),
            route("css-grid", "CSS Grid", "Layouts"),
        ]
    }

    #[test]
    fn bad_page_values_default_to_first() {
        for raw in ["", "0", "-3", "two", "1.5"] {
            let q = ListQuery::from_params(&params(&[("page", raw)]));
            assert_eq!(q.page, 1, "page={raw}");
        }
        assert_eq!(ListQuery::from_params(&params(&[("page", "4")])).page, 4);
    }

    #[test]
    fn search_is_trimmed() {
        let q = ListQuery::from_params(&params(&[("search", "  rust  ")]));
        assert_eq!(q.search, "rust");
    }

    #[test]
    fn empty_search_shows_everything() {
        let routes = sample();
        assert_eq!(filter_routes(&routes, "").len(), routes.len());
        assert_eq!(filter_routes(&routes, "   ").len(), routes.len());
    }

    #[test]
    fn search_matches_title_description_and_id_case_insensitively() {
        let routes = sample();
        let ids = |s: &str| -> Vec<String> {
            filter_routes(&routes, s).iter().map(|r| r.id.clone()).collect()
        };
        assert_eq!(ids("RUST"), vec!["rust-ownership", "rust-async"]);
        assert_eq!(ids("scully"), vec!["static-sites"]);
        assert_eq!(ids("css-grid"), vec!["css-grid"]);
        assert_eq!(ids("rust tokio"), vec!["rust-async"]);
        assert!(ids("haskell").is_empty());
    }

    #[test]
    fn paginate_clamps_out_of_range_pages() {
        let items: Vec<u32> = (1..=7).collect();
        let last = paginate(&items, 99, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![7]);
        assert!(last.has_prev());
        assert!(!last.has_next());

        let first = paginate(&items, 0, 3);
        assert_eq!(first.page, 1);
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);
    }

    #[test]
    fn empty_list_still_has_one_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 5, 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn canonical_query_omits_defaults() {
        assert_eq!(ListQuery::default().canonical_query(), "");
        let q = ListQuery {
            page: 2,
            search: "rust & c".into(),
        };
        assert_eq!(q.canonical_query(), "search=rust+%26+c&page=2");
        assert_eq!(q.with_page(1).canonical_query(), "search=rust+%26+c");
    }

    #[test]
    fn non_canonical_queries_are_detected() {
        let first = ListQuery::from_params(&params(&[("page", "1")]));
        assert!(!first.is_canonical(Some("page=1")));
        assert!(first.is_canonical(None));
        assert!(first.is_canonical(Some("")));

        let padded = ListQuery::from_params(&params(&[("search", " rust ")]));
        assert!(!padded.is_canonical(Some("search=+rust+")));

        let clean = ListQuery::from_params(&params(&[("search", "rust"), ("page", "2")]));
        assert!(clean.is_canonical(Some("search=rust&page=2")));
        assert!(!clean.is_canonical(Some("page=2&search=rust")));

        let repeated = ListQuery::from_params(&params(&[("page", "2")]));
        assert!(!repeated.is_canonical(Some("page=2&page=2")));

        let extra = ListQuery::from_params(&params(&[("utm", "x")]));
        assert!(!extra.is_canonical(Some("utm=x")));
    }

    #[test]
    fn list_reports_the_clamped_state() {
        let routes = sample();
        let requested = ListQuery {
            page: 9,
            search: "rust".into(),
        };
        let listing = list(&routes, &requested, 1);
        assert_eq!(listing.query.page, 2);
        assert_eq!(listing.page.total_items, 2);
        assert_eq!(listing.page.items[0].id, "rust-async");
    }

    #[test]
    fn link_styles() {
        let q = ListQuery {
            page: 3,
            search: "x".into(),
        };
        assert_eq!(LinkStyle::Query.href(&q), "/blog?search=x&page=3");
        assert_eq!(LinkStyle::Query.href(&ListQuery::default()), "/blog");
        assert_eq!(LinkStyle::Static.href(&q), "/blog/page/3/");
        assert_eq!(LinkStyle::Static.href(&q.with_page(1)), "/blog/");
    }
}
