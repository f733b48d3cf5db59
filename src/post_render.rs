//! Transformations applied to fully rendered pages.

use htmlescape::encode_minimal;
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::{heading_rank, TocConfig};
use crate::error::{Result, SiteError};

#[derive(Debug, Clone, PartialEq)]
struct TocEntry {
    level: u8,
    id: String,
    text: String,
}

/// Builds a table of contents from the headings inside the blog area and
/// places it inside the element named by `insert_selector`.
///
/// Headings without an id cannot be linked and are skipped. A page without
/// matching headings, or without the insertion point, is returned as is.
pub fn insert_toc(html: &str, route: &str, config: &TocConfig) -> Result<String> {
    let entries = collect_headings(html, config)?;
    if entries.is_empty() {
        return Ok(html.to_string());
    }

    let target_id = config.insert_selector.trim_start_matches('#');
    let Some(insert_at) = opening_tag_end(html, target_id) else {
        debug!(route, selector = %config.insert_selector, "no TOC insertion point");
        return Ok(html.to_string());
    };

    let list = build_list(&entries, route, config);
    let mut out = String::with_capacity(html.len() + list.len());
    out.push_str(&html[..insert_at]);
    out.push_str(&list);
    out.push_str(&html[insert_at..]);
    Ok(out)
}

fn collect_headings(html: &str, config: &TocConfig) -> Result<Vec<TocEntry>> {
    let area = Selector::parse(&config.blog_area_selector)
        .map_err(|e| SiteError::Selector(format!("{}: {e}", config.blog_area_selector)))?;
    let headings_css = config.levels.join(", ");
    let headings = Selector::parse(&headings_css)
        .map_err(|e| SiteError::Selector(format!("{headings_css}: {e}")))?;

    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    for region in document.select(&area) {
        for heading in region.select(&headings) {
            let element = heading.value();
            let (Some(id), Some(level)) = (element.attr("id"), heading_rank(element.name())) else {
                continue;
            };
            let text = heading.text().collect::<String>();
            entries.push(TocEntry {
                level,
                id: id.to_string(),
                text: text.trim().to_string(),
            });
        }
    }
    Ok(entries)
}

fn build_list(entries: &[TocEntry], route: &str, config: &TocConfig) -> String {
    let base = entries.iter().map(|e| e.level).min().unwrap_or(1);
    let mut out = String::from("<ul>");
    let mut depth = 0usize;

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            let target = usize::from(entry.level - base).min(depth + 1);
            if target > depth {
                out.push_str("<ul>");
            } else {
                out.push_str("</li>");
                for _ in target..depth {
                    out.push_str("</ul></li>");
                }
            }
            depth = target;
        }
        out.push_str(&toc_link(entry, route, config));
    }

    out.push_str("</li>");
    for _ in 0..depth {
        out.push_str("</ul></li>");
    }
    out.push_str("</ul>");
    out
}

fn toc_link(entry: &TocEntry, route: &str, config: &TocConfig) -> String {
    let route = route.trim_end_matches('/');
    let href = if config.trailing_slash {
        format!("{route}/#{}", entry.id)
    } else {
        format!("{route}#{}", entry.id)
    };
    let onclick = if config.scroll_into_view_on_click {
        format!(
            " onclick=\"document.getElementById('{}').scrollIntoView()\"",
            encode_minimal(&entry.id)
        )
    } else {
        String::new()
    };
    format!(
        "<li><a href=\"{}\"{onclick}>{}</a>",
        encode_minimal(&href),
        encode_minimal(&entry.text)
    )
}

/// Byte offset just past the `>` of the start tag carrying an `id` attribute
/// equal to `id`. Quoted attribute values are skipped, so neither `data-id`
/// nor a `>` inside a value is mistaken for the target.
fn opening_tag_end(html: &str, id: &str) -> Option<usize> {
    let mut in_tag = false;
    let mut quote: Option<u8> = None;
    let mut matched = false;

    for (i, &b) in html.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'<' if !in_tag => {
                in_tag = true;
                matched = false;
            }
            b'>' if in_tag => {
                if matched {
                    return Some(i + 1);
                }
                in_tag = false;
            }
            b'"' | b'\'' if in_tag => quote = Some(b),
            _ if in_tag && b.is_ascii_whitespace() => {
                matched |= id_attr_is(&html[i + 1..], id);
            }
            _ => {}
        }
    }
    None
}

fn id_attr_is(rest: &str, id: &str) -> bool {
    let Some(value) = rest.strip_prefix("id=") else {
        return false;
    };
    ['"', '\''].into_iter().any(|q| {
        value
            .strip_prefix(q)
            .and_then(|v| v.strip_prefix(id))
            .map_or(false, |v| v.starts_with(q))
    })
}

/// Points the page's `<base href>` at `href`. Pages without a base tag are left alone.
pub fn rewrite_base_href(html: &str, href: &str) -> String {
    const BASE: &str = "<base href=\"";
    let Some(start) = html.find(BASE).map(|i| i + BASE.len()) else {
        return html.to_string();
    };
    let Some(len) = html[start..].find('"') else {
        return html.to_string();
    };
    let mut out = String::with_capacity(html.len() + href.len());
    out.push_str(&html[..start]);
    out.push_str(&encode_minimal(href));
    out.push_str(&html[start + len..]);
    out
}
