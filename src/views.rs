//! HTML for every page. Pages are assembled from the `layout.html` shell in
//! the content directory, which carries `{{ title }}`, `{{ head }}`,
//! `{{ header }}`, `{{ hero }}` and `{{ content }}` placeholders.

use htmlescape::encode_minimal;

use crate::blog::{LinkStyle, Listing};
use crate::models::{title_from_id, BlogRoute, Post, StaticPage};

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

const THEME_SCRIPT: &str = r#"<script>
function themeSwitch() {
    const root = document.getElementById("oHTML");
    if (!root) return;
    root.setAttribute("data-theme", root.getAttribute("data-theme") === "dark" ? "light" : "dark");
}
</script>"#;

pub const ABOUT_IMAGE: &str = "/static/about.jpg";
pub const CONTACT_IMAGE: &str = "/static/contact.jpg";
pub const RESUME_IMAGE: &str = "/static/resume.jpg";
pub const NOT_FOUND_IMAGE: &str = "/static/404.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Blog,
    About,
    Resume,
    Contact,
    Other,
}

const NAV: [(Section, &str, &str); 4] = [
    (Section::Blog, "/blog", "Blog"),
    (Section::About, "/about", "About"),
    (Section::Resume, "/resume", "Resume"),
    (Section::Contact, "/contact", "Contact"),
];

/// Background image at the top of a page. Static pages use the
/// `para-top` parallax band, posts and the 404 page use `photo-top`.
#[derive(Debug, Clone)]
pub enum Hero {
    Parallax(String),
    Photo(Option<String>),
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub title: String,
    pub section: Section,
    pub hero: Hero,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    pub is_development: bool,
    pub analytics_id: Option<&'a str>,
}

pub fn render_with_layout(layout: &str, view: &PageView, options: RenderOptions<'_>) -> String {
    let mut head = String::from(THEME_SCRIPT);
    if let Some(id) = options.analytics_id {
        head.push_str(&analytics_snippet(id));
    }

    let mut page = layout
        .replace("{{ title }}", &encode_minimal(&view.title))
        .replace("{{ head }}", &head)
        .replace("{{ header }}", &render_header(view.section))
        .replace("{{ hero }}", &render_hero(&view.hero))
        .replace("{{ content }}", &view.body);

    if options.is_development {
        page = page.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
    }

    page
}

fn render_header(active: Section) -> String {
    let mut links = String::new();
    for (section, href, label) in NAV {
        let class = if section == active { " class=\"active\"" } else { "" };
        links.push_str(&format!("<li><a href=\"{href}\"{class}>{label}</a></li>"));
    }
    format!(
        "<header class=\"site-header\"><nav><ul>{links}</ul></nav>\
         <button id=\"theme-toggle\" type=\"button\" onclick=\"themeSwitch()\" \
         aria-label=\"Toggle dark mode\">Theme</button></header>"
    )
}

fn render_hero(hero: &Hero) -> String {
    match hero {
        Hero::Parallax(src) => format!(
            "<div id=\"para-top\" class=\"hero\" style=\"background-image: url('{}')\"></div>",
            encode_minimal(src)
        ),
        Hero::Photo(Some(src)) => format!(
            "<div id=\"photo-top\" class=\"hero\" style=\"background-image: url('{}')\"></div>",
            encode_minimal(src)
        ),
        Hero::Photo(None) => "<div id=\"photo-top\" class=\"hero\"></div>".to_string(),
    }
}

fn analytics_snippet(id: &str) -> String {
    let id = encode_minimal(id);
    format!(
        "<script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>\
         <script>window.dataLayer = window.dataLayer || [];\
         function gtag(){{dataLayer.push(arguments);}}\
         gtag('js', new Date());gtag('config', '{id}');</script>"
    )
}

pub fn blog_list_view(listing: &Listing<'_>, style: LinkStyle) -> PageView {
    let mut body = String::from("<section class=\"blog\"><h1>Blog</h1>");

    if style == LinkStyle::Query {
        body.push_str(&format!(
            "<form class=\"search\" method=\"get\" action=\"/blog\">\
             <input type=\"search\" name=\"search\" placeholder=\"Search posts\" value=\"{}\">\
             <button type=\"submit\">Search</button></form>",
            encode_minimal(&listing.query.search)
        ));
    }

    if listing.page.items.is_empty() {
        if listing.query.search.is_empty() {
            body.push_str("<p class=\"empty\">No posts yet.</p>");
        } else {
            body.push_str(&format!(
                "<p class=\"empty\">No posts match &ldquo;{}&rdquo;.</p>",
                encode_minimal(&listing.query.search)
            ));
        }
    } else {
        body.push_str("<ul class=\"posts\">");
        for route in &listing.page.items {
            body.push_str(&post_card(route, style));
        }
        body.push_str("</ul>");
    }

    body.push_str(&pager(listing, style));
    body.push_str("</section>");

    PageView {
        title: "Blog".to_string(),
        section: Section::Blog,
        hero: Hero::Photo(None),
        body,
    }
}

fn post_card(route: &BlogRoute, style: LinkStyle) -> String {
    let href = match style {
        LinkStyle::Query => route.route.clone(),
        LinkStyle::Static => format!("{}/", route.route),
    };
    let date = route
        .display_date()
        .map(|d| format!("<time>{d}</time>"))
        .unwrap_or_default();
    format!(
        "<li class=\"post-card\"><a href=\"{}\"><h2>{}</h2></a>{date}<p>{}</p></li>",
        encode_minimal(&href),
        encode_minimal(&route.title),
        encode_minimal(&route.description)
    )
}

fn pager(listing: &Listing<'_>, style: LinkStyle) -> String {
    let page = &listing.page;
    if page.total_pages <= 1 {
        return String::new();
    }
    let mut out = String::from("<nav class=\"pager\">");
    if page.has_prev() {
        out.push_str(&format!(
            "<a rel=\"prev\" href=\"{}\">Newer</a>",
            encode_minimal(&style.href(&listing.query.with_page(page.page - 1)))
        ));
    }
    out.push_str(&format!(
        "<span>Page {} of {}</span>",
        page.page, page.total_pages
    ));
    if page.has_next() {
        out.push_str(&format!(
            "<a rel=\"next\" href=\"{}\">Older</a>",
            encode_minimal(&style.href(&listing.query.with_page(page.page + 1)))
        ));
    }
    out.push_str("</nav>");
    out
}

/// The browser title always comes from the id; the visible heading uses the front matter title.
pub fn post_view(post: &Post) -> PageView {
    let meta = &post.meta;
    let date = meta
        .display_date()
        .map(|d| format!("<p class=\"post-date\">{d}</p>"))
        .unwrap_or_default();
    let body = format!(
        "<article class=\"post\"><h1>{}</h1>{date}<nav id=\"toc\"></nav>\
         <div class=\"blog-content\">{}</div></article>",
        encode_minimal(&meta.title),
        post.body_html
    );
    PageView {
        title: title_from_id(&meta.id),
        section: Section::Blog,
        hero: Hero::Photo(meta.picture.clone()),
        body,
    }
}

pub fn static_page_view(page: &StaticPage, section: Section, image: &str) -> PageView {
    PageView {
        title: page.title.clone(),
        section,
        hero: Hero::Parallax(image.to_string()),
        body: format!(
            "<section class=\"page\"><h1>{}</h1>{}</section>",
            encode_minimal(&page.title),
            page.body_html
        ),
    }
}

/// `{{path}}` in the not-found template is replaced with the requested path.
pub fn not_found_view(template: &str, path: &str) -> PageView {
    PageView {
        title: "Not Found".to_string(),
        section: Section::Other,
        hero: Hero::Photo(Some(NOT_FOUND_IMAGE.to_string())),
        body: template.replace("{{path}}", &encode_minimal(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{list, ListQuery};
    use chrono::NaiveDate;

    const LAYOUT: &str = "<html id=\"oHTML\"><head><title>{{ title }}</title>{{ head }}</head>\
                          <body>{{ header }}{{ hero }}{{ content }}</body></html>";

    fn route(id: &str) -> BlogRoute {
        BlogRoute {
            route: format!("/posts/{id}"),
            id: id.to_string(),
            title: format!("Title <{id}>"),
            date: NaiveDate::from_ymd_opt(2023, 3, 9),
            description: "desc".to_string(),
            picture: None,
        }
    }

    #[test]
    fn layout_substitution_escapes_title_and_marks_active_section() {
        let view = PageView {
            title: "A & B".into(),
            section: Section::Contact,
            hero: Hero::Parallax(CONTACT_IMAGE.into()),
            body: "<p>body</p>".into(),
        };
        let html = render_with_layout(LAYOUT, &view, RenderOptions::default());
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<a href=\"/contact\" class=\"active\">Contact</a>"));
        assert!(html.contains("id=\"para-top\""));
        assert!(html.contains("themeSwitch()"));
        assert!(!html.contains("WebSocket"));
        assert!(!html.contains("googletagmanager"));
    }

    #[test]
    fn development_and_analytics_snippets() {
        let view = not_found_view("<p>{{path}}</p>", "/x<y>");
        let html = render_with_layout(
            LAYOUT,
            &view,
            RenderOptions {
                is_development: true,
                analytics_id: Some("G-TEST"),
            },
        );
        assert!(html.contains("WebSocket"));
        assert!(html.contains("gtag('config', 'G-TEST')"));
        assert!(html.contains("<p>/x&lt;y&gt;</p>"));
    }

    #[test]
    fn list_view_renders_cards_search_and_pager() {
        let routes: Vec<_> = ["a", "b", "c"].iter().map(|id| route(id)).collect();
        let listing = list(&routes, &ListQuery { page: 2, search: String::new() }, 1);
        let view = blog_list_view(&listing, LinkStyle::Query);
        assert!(view.body.contains("Title &lt;b&gt;"));
        assert!(view.body.contains("March 9, 2023"));
        assert!(view.body.contains("href=\"/blog\">Newer"));
        assert!(view.body.contains("href=\"/blog?page=3\">Older"));
        assert!(view.body.contains("Page 2 of 3"));
        assert!(view.body.contains("<form class=\"search\""));

        let static_view = blog_list_view(&listing, LinkStyle::Static);
        assert!(!static_view.body.contains("<form"));
        assert!(static_view.body.contains("href=\"/posts/b/\""));
        assert!(static_view.body.contains("href=\"/blog/page/3/\""));
    }

    #[test]
    fn empty_search_result_message() {
        let routes = vec![route("a")];
        let listing = list(&routes, &ListQuery { page: 1, search: "zzz".into() }, 5);
        let view = blog_list_view(&listing, LinkStyle::Query);
        assert!(view.body.contains("No posts match &ldquo;zzz&rdquo;"));
        assert!(!view.body.contains("class=\"pager\""));
    }

    #[test]
    fn post_view_has_toc_slot_and_picture() {
        let mut meta = route("my-post");
        meta.picture = Some("/static/p.jpg".into());
        let post = Post {
            meta,
            body_html: "<h2 id=\"x\">X</h2>".into(),
        };
        let view = post_view(&post);
        assert_eq!(view.title, "My Post");
        assert!(view.body.contains("<nav id=\"toc\"></nav>"));
        assert!(view.body.contains("<div class=\"blog-content\"><h2 id=\"x\">X</h2></div>"));
        assert!(matches!(view.hero, Hero::Photo(Some(ref p)) if p == "/static/p.jpg"));
    }
}
