//! Static pre-rendering of every route into an output directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::fs;
use tracing::{debug, info};

use crate::blog::{self, LinkStyle, ListQuery};
use crate::config::SiteConfig;
use crate::content_loader::load_content;
use crate::error::{Result, SiteError};
use crate::post_render::{insert_toc, rewrite_base_href};
use crate::views::{
    self, render_with_layout, PageView, RenderOptions, Section, ABOUT_IMAGE, CONTACT_IMAGE,
    RESUME_IMAGE,
};

const INDEX_REDIRECT: &str = "<!DOCTYPE html><html><head><base href=\"/\">\
<meta http-equiv=\"refresh\" content=\"0; url=/blog/\"><link rel=\"canonical\" href=\"/blog/\">\
</head><body><a href=\"/blog/\">Blog</a></body></html>";

#[derive(Debug)]
pub struct BuildReport {
    /// HTML files written, including posts.
    pub pages: usize,
    pub posts: usize,
    pub assets: usize,
    pub duration_ms: u64,
    pub out_dir: PathBuf,
}

struct PageWriter<'a> {
    out_dir: &'a Path,
    base_href: Option<&'a str>,
    pages: usize,
}

impl PageWriter<'_> {
    async fn write_html(&mut self, relative: &str, html: &str) -> Result<()> {
        let html = match self.base_href {
            Some(href) => rewrite_base_href(html, href),
            None => html.to_string(),
        };
        write_file(&self.out_dir.join(relative), html.as_bytes()).await?;
        self.pages += 1;
        Ok(())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SiteError::io(parent, e))?;
    }
    fs::write(path, bytes).await.map_err(|e| SiteError::io(path, e))?;
    debug!(path = %path.display(), "wrote");
    Ok(())
}

pub async fn build(config: &SiteConfig, out_dir: &Path) -> Result<BuildReport> {
    let start = Instant::now();
    info!(content = %config.content_dir.display(), out = %out_dir.display(), "pre-rendering site");

    let content = load_content(&config.content_dir).await?;
    let options = RenderOptions {
        is_development: false,
        analytics_id: config.analytics_id.as_deref(),
    };
    let render = |view: &PageView| render_with_layout(&content.layout_html, view, options);
    let mut writer = PageWriter {
        out_dir,
        base_href: config.base_href.as_deref(),
        pages: 0,
    };

    writer.write_html("index.html", INDEX_REDIRECT).await?;

    let routes = content.routes();
    let total_pages = blog::total_pages(routes.len(), config.page_size);
    for n in 1..=total_pages {
        let query = ListQuery::default().with_page(n);
        let listing = blog::list(&routes, &query, config.page_size);
        let html = render(&views::blog_list_view(&listing, LinkStyle::Static));
        let relative = if n == 1 {
            "blog/index.html".to_string()
        } else {
            format!("blog/page/{n}/index.html")
        };
        writer.write_html(&relative, &html).await?;
    }

    for post in &content.posts {
        let html = render(&views::post_view(post));
        let html = insert_toc(&html, &post.meta.route, &config.toc)?;
        writer
            .write_html(&format!("posts/{}/index.html", post.meta.id), &html)
            .await?;
    }

    let static_pages = [
        ("about", &content.about, Section::About, ABOUT_IMAGE),
        ("contact", &content.contact, Section::Contact, CONTACT_IMAGE),
        ("resume", &content.resume, Section::Resume, RESUME_IMAGE),
    ];
    for (name, page, section, image) in static_pages {
        let html = render(&views::static_page_view(page, section, image));
        writer.write_html(&format!("{name}/index.html"), &html).await?;
    }

    let not_found = render(&views::not_found_view(&content.not_found_html, ""));
    writer.write_html("404.html", &not_found).await?;

    let index = serde_json::to_vec_pretty(&routes)?;
    write_file(&out_dir.join("routes.json"), &index).await?;

    let static_src = config.content_dir.join("static");
    let assets = if fs::try_exists(&static_src).await.unwrap_or(false) {
        copy_dir(&static_src, &out_dir.join("static")).await?
    } else {
        0
    };

    Ok(BuildReport {
        pages: writer.pages,
        posts: content.posts.len(),
        assets,
        duration_ms: start.elapsed().as_millis() as u64,
        out_dir: out_dir.to_path_buf(),
    })
}

/// Copies a directory tree, returning the number of files copied.
async fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
    let mut copied = 0;
    while let Some((src, dst)) = pending.pop() {
        fs::create_dir_all(&dst)
            .await
            .map_err(|e| SiteError::io(&dst, e))?;
        let mut entries = fs::read_dir(&src).await.map_err(|e| SiteError::io(&src, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SiteError::io(&src, e))?
        {
            let path = entry.path();
            let target = dst.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SiteError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push((path, target));
            } else {
                fs::copy(&path, &target)
                    .await
                    .map_err(|e| SiteError::io(&path, e))?;
                copied += 1;
            }
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_loader::tests::write_site;

    fn post(n: usize) -> (String, String) {
        (
            format!("post-{n}"),
            format!("---\ntitle: Post {n}\ndate: 2022-01-{n:02}\n---\n## Part {n}\nbody"),
        )
    }

    #[tokio::test]
    async fn writes_every_route() {
        let site = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let posts: Vec<(String, String)> = (1..=5).map(post).collect();
        let borrowed: Vec<(&str, &str)> = posts.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        write_site(site.path(), &borrowed);
        std::fs::create_dir_all(site.path().join("static/img")).unwrap();
        std::fs::write(site.path().join("static/img/a.jpg"), b"jpg").unwrap();

        let config = SiteConfig {
            content_dir: site.path().to_path_buf(),
            page_size: 2,
            base_href: Some("https://christopherschedler.com/".into()),
            ..SiteConfig::default()
        };
        let report = build(&config, out.path()).await.unwrap();

        // index + 3 list pages + 5 posts + 3 static pages + 404
        assert_eq!(report.pages, 13);
        assert_eq!(report.posts, 5);
        assert_eq!(report.assets, 2);

        let read = |rel: &str| std::fs::read_to_string(out.path().join(rel)).unwrap();

        let first = read("blog/index.html");
        assert!(first.contains(">Post 5<"));
        assert!(first.contains("href=\"/blog/page/2/\""));
        assert!(first.contains("<base href=\"https://christopherschedler.com/\">"));
        assert!(read("blog/page/3/index.html").contains(">Post 1<"));
        assert!(!out.path().join("blog/page/4/index.html").exists());

        let post = read("posts/post-3/index.html");
        assert!(post.contains("href=\"/posts/post-3/#part-3\""));
        assert!(read("index.html").contains("url=/blog/"));
        assert!(read("resume/index.html").contains("<h2 id=\"work\">Work</h2>"));
        assert!(out.path().join("404.html").exists());
        assert_eq!(std::fs::read(out.path().join("static/img/a.jpg")).unwrap(), b"jpg");

        let index: serde_json::Value = serde_json::from_str(&read("routes.json")).unwrap();
        assert_eq!(index.as_array().unwrap().len(), 5);
        assert_eq!(index[0]["id"], "post-5");
    }

    #[tokio::test]
    async fn empty_blog_still_has_a_list_page() {
        let site = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_site(site.path(), &[]);
        std::fs::create_dir_all(site.path().join("posts")).unwrap();
        let config = SiteConfig {
            content_dir: site.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let report = build(&config, out.path()).await.unwrap();
        assert_eq!(report.posts, 0);
        let list = std::fs::read_to_string(out.path().join("blog/index.html")).unwrap();
        assert!(list.contains("No posts yet."));
        assert!(list.contains("<base href=\"/\">"));
    }
}
