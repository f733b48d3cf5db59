use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use gray_matter::{engine::YAML, Matter};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::{Result, SiteError};
use crate::markdown::render_markdown_to_html;
use crate::models::{BlogRoute, FrontMatter, Post, StaticPage};
use crate::state::AppState;

/// Everything read from the content directory.
#[derive(Debug, Clone, Default)]
pub struct SiteContent {
    pub layout_html: String,
    pub not_found_html: String,
    pub about: StaticPage,
    pub contact: StaticPage,
    pub resume: StaticPage,
    /// Newest first.
    pub posts: Vec<Post>,
}

impl SiteContent {
    pub fn routes(&self) -> Vec<BlogRoute> {
        self.posts.iter().map(|p| p.meta.clone()).collect()
    }

    pub fn find_post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.meta.id == id)
    }
}

async fn read(path: PathBuf) -> Result<String> {
    fs::read_to_string(&path)
        .await
        .map_err(|e| SiteError::io(&path, e))
}

pub async fn load_content(content_dir: &Path) -> Result<SiteContent> {
    let layout_html = read(content_dir.join("layout.html")).await?;
    let not_found_html = read(content_dir.join("not_found.html")).await?;

    let about = load_static_page(content_dir, "about", "About").await?;
    let contact = load_static_page(content_dir, "contact", "Contact").await?;
    let resume = load_static_page(content_dir, "resume", "Resume").await?;

    let posts_dir = content_dir.join("posts");
    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&posts_dir)
        .await
        .map_err(|e| SiteError::io(&posts_dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SiteError::io(&posts_dir, e))?
    {
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "md") {
            paths.push(path);
        }
    }

    let loaded = join_all(paths.into_iter().map(load_post)).await;
    let mut posts = Vec::with_capacity(loaded.len());
    for result in loaded {
        match result {
            Ok(Some(post)) => posts.push(post),
            Ok(None) => {}
            Err(e) => error!("Skipping post: {}", e),
        }
    }
    sort_posts(&mut posts);
    debug!(count = posts.len(), "loaded posts");

    Ok(SiteContent {
        layout_html,
        not_found_html,
        about,
        contact,
        resume,
        posts,
    })
}

async fn load_static_page(content_dir: &Path, name: &str, default_title: &str) -> Result<StaticPage> {
    let path = content_dir.join(format!("{name}.md"));
    let raw = read(path.clone()).await?;
    let (front_matter, body) = split_front_matter(&path, &raw)?;
    Ok(StaticPage {
        title: front_matter
            .title
            .unwrap_or_else(|| default_title.to_string()),
        body_html: render_markdown_to_html(&body),
    })
}

async fn load_post(path: PathBuf) -> Result<Option<Post>> {
    let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
        warn!(path = %path.display(), "post file name is not valid UTF-8");
        return Ok(None);
    };
    let raw = read(path.clone()).await?;
    parse_post(&path, &id, &raw)
}

/// Parses one post file. Drafts (`published: false`) yield `None`.
pub fn parse_post(path: &Path, id: &str, raw: &str) -> Result<Option<Post>> {
    let (front_matter, body) = split_front_matter(path, raw)?;
    if front_matter.published == Some(false) {
        debug!(post = id, "skipping unpublished post");
        return Ok(None);
    }
    Ok(Some(Post {
        meta: BlogRoute::from_front_matter(id, &front_matter),
        body_html: render_markdown_to_html(&body),
    }))
}

fn split_front_matter(path: &Path, raw: &str) -> Result<(FrontMatter, String)> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(raw)
        .map_err(|e| SiteError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok((parsed.data.unwrap_or_default(), parsed.content))
}

/// Newest first; undated posts last; ties by id.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        let by_date = match (a.meta.date, b.meta.date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| a.meta.id.cmp(&b.meta.id))
    });
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.config.content_dir).await {
        Ok(content) => {
            *app_state.content.write().await = content;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {}", e);
        }
    }
}
