use std::collections::HashSet;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_MATH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

pub fn render_markdown_to_html(markdown: &str) -> String {
    let normalized_markdown = normalize_latex_delimiters(markdown);
    let events: Vec<Event<'_>> = Parser::new_ext(&normalized_markdown, markdown_options())
        .map(|event| match event {
            Event::InlineMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, false).into_boxed_str())),
            Event::DisplayMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, true).into_boxed_str())),
            other => other,
        })
        .collect();

    let mut html_out = String::new();
    html::push_html(&mut html_out, assign_heading_ids(events).into_iter());
    html_out
}

/// Gives every heading without an explicit `{#id}` a slug id, unique within the document.
fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut used: HashSet<String> = HashSet::new();

    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            used.insert(id.to_string());
        }
    }

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }
        let slug = unique_slug(&text, &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::Boxed(slug.into_boxed_str()));
        }
    }
    events
}

fn unique_slug(text: &str, used: &mut HashSet<String>) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base = "section".to_string();
    }
    let mut slug = base.clone();
    let mut n = 1;
    while used.contains(&slug) {
        slug = format!("{base}-{n}");
        n += 1;
    }
    used.insert(slug.clone());
    slug
}

pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                if display_mode || content.contains('\n') {
                    out.push_str("$$");
                    out.push_str(content);
                    out.push_str("$$");
                } else {
                    out.push('$');
                    out.push_str(content);
                    out.push('$');
                }
                i = content_end + close.len();
                continue;
            }
        }

        if let Some(ch) = input[i..].chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let mut opts = katex::Opts::builder();
    opts.display_mode(display_mode);

    let rendered = match opts.build() {
        Ok(opts) => katex::render_with_opts(source, opts),
        Err(_) => return fallback_math_html(source, display_mode),
    };

    match rendered {
        Ok(html) => html,
        Err(_) => fallback_math_html(source, display_mode),
    }
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    let escaped = htmlescape::encode_minimal(source);
    format!("<span class=\"{class_name}\">{escaped}</span>")
}
