use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::blog::{self, LinkStyle, ListQuery};
use crate::content_loader::SiteContent;
use crate::hot_reload::ws_handler;
use crate::post_render::insert_toc;
use crate::state::{AppState, RouterState};
use crate::views::{
    self, render_with_layout, PageView, RenderOptions, Section, ABOUT_IMAGE, CONTACT_IMAGE,
    RESUME_IMAGE,
};

pub fn router(state: RouterState) -> Router {
    let static_root = state.app_state.config.content_dir.join("static");
    let static_dir = get_service(ServeDir::new(&static_root));
    let favicon_ico = get_service(ServeFile::new(static_root.join("favicon.ico")));

    let mut app = Router::new()
        .route("/", get(|| async { Redirect::to("/blog") }))
        .route("/blog", get(blog_list))
        .route("/posts/{id}", get(render_post))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/resume", get(resume))
        .route("/routes.json", get(routes_json))
        .nest_service("/static", static_dir)
        .route_service("/favicon.ico", favicon_ico);

    if state.app_state.is_development {
        app = app.route("/ws", get(ws_handler));
    }

    app.fallback(fallback)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn render_options(state: &AppState) -> RenderOptions<'_> {
    RenderOptions {
        is_development: state.is_development,
        analytics_id: state.config.analytics_id.as_deref(),
    }
}

fn page(state: &AppState, content: &SiteContent, view: &PageView) -> Html<String> {
    Html(render_with_layout(&content.layout_html, view, render_options(state)))
}

async fn blog_list(
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    State(state): State<Arc<AppState>>,
) -> Response {
    let requested = ListQuery::from_params(&params);
    let content = state.content.read().await;
    let routes = content.routes();
    let listing = blog::list(&routes, &requested, state.config.page_size);

    if !listing.query.is_canonical(uri.query()) {
        let canonical = LinkStyle::Query.href(&listing.query);
        debug!(?params, %canonical, "redirecting to canonical list url");
        return Redirect::to(&canonical).into_response();
    }

    let view = views::blog_list_view(&listing, LinkStyle::Query);
    page(&state, &content, &view).into_response()
}

async fn render_post(
    Path(id): Path<String>,
    uri: Uri,
    State(state): State<Arc<AppState>>,
) -> Response {
    let content = state.content.read().await;
    let Some(post) = content.find_post(&id) else {
        let view = views::not_found_view(&content.not_found_html, uri.path());
        return (StatusCode::NOT_FOUND, page(&state, &content, &view)).into_response();
    };

    let Html(html) = page(&state, &content, &views::post_view(post));
    let html = match insert_toc(&html, &post.meta.route, &state.config.toc) {
        Ok(with_toc) => with_toc,
        Err(e) => {
            warn!(post = %id, "skipping table of contents: {}", e);
            html
        }
    };
    Html(html).into_response()
}

async fn about(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = state.content.read().await;
    let view = views::static_page_view(&content.about, Section::About, ABOUT_IMAGE);
    page(&state, &content, &view)
}

async fn contact(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = state.content.read().await;
    let view = views::static_page_view(&content.contact, Section::Contact, CONTACT_IMAGE);
    page(&state, &content, &view)
}

async fn resume(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = state.content.read().await;
    let view = views::static_page_view(&content.resume, Section::Resume, RESUME_IMAGE);
    page(&state, &content, &view)
}

async fn routes_json(State(state): State<Arc<AppState>>) -> Response {
    let content = state.content.read().await;
    Json(content.routes()).into_response()
}

async fn fallback(uri: Uri) -> Redirect {
    debug!(path = %uri.path(), "unmatched route, redirecting to blog");
    Redirect::to("/blog")
}
