use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    #[serde(alias = "datePublished")]
    pub date: Option<String>,
    pub description: Option<String>,
    pub picture: Option<String>,
    pub published: Option<bool>,
}

/// Metadata for one post, keyed by its route.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlogRoute {
    pub route: String,
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub picture: Option<String>,
}

/// A loaded post: route metadata plus its rendered body.
#[derive(Debug, Clone)]
pub struct Post {
    pub meta: BlogRoute,
    pub body_html: String,
}

/// A static page (about, contact, resume) rendered from Markdown.
#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    pub title: String,
    pub body_html: String,
}

impl BlogRoute {
    pub fn from_front_matter(id: &str, front_matter: &FrontMatter) -> Self {
        let title = front_matter
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_id(id));
        let date = front_matter.date.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(post = id, date = raw, "ignoring unparsable publish date");
            }
            parsed
        });
        Self {
            route: post_route(id),
            id: id.to_string(),
            title,
            date,
            description: front_matter.description.clone().unwrap_or_default(),
            picture: front_matter.picture.clone().filter(|p| !p.is_empty()),
        }
    }

    pub fn display_date(&self) -> Option<String> {
        self.date.map(|d| d.format("%B %-d, %Y").to_string())
    }
}

pub fn post_route(id: &str) -> String {
    format!("/posts/{id}")
}

/// `my-first-post` becomes `My First Post`.
///
/// Dashes become spaces one for one. Each run of non-whitespace is
/// title-cased from its first ASCII word character on, so `(foo)` becomes
/// `(Foo)`.
pub fn title_from_id(id: &str) -> String {
    let spaced = id.replace('-', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut in_word = false;
    for c in spaced.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_ascii_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
