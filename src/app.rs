//! Web front end: image selection, prediction trigger, and the
//! three-panel comparison view.

use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{client::PredictClient, codec, dataset::Dataset, error::Error};

#[derive(Clone)]
pub struct AppState {
    pub dataset: Dataset,
    pub client: PredictClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(run_predict))
        .route("/images/:id", get(image_png))
        .route("/masks/:id", get(mask_png))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct SelectQuery {
    id: Option<String>,
}

#[derive(Deserialize)]
struct PredictForm {
    id: String,
}

async fn healthz() -> &'static str {
    "ok"
}

/// Selection page. With `?id=` it also shows the reference image, its
/// ground-truth mask, and the predict button.
async fn index(State(state): State<AppState>, Query(query): Query<SelectQuery>) -> Response {
    let ids = match state.dataset.list_ids() {
        Ok(ids) => ids,
        Err(err) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    let selected = query.id.filter(|id| !id.is_empty());
    if let Some(id) = &selected {
        if !ids.contains(id) {
            let message = format!("no image with id {id:?} in the test set");
            return error_page(StatusCode::NOT_FOUND, &message);
        }
        // A listed id only guarantees the image; the mask may still be
        // missing.
        if let Err(err) = state.dataset.check_pair(id) {
            return error_page(StatusCode::NOT_FOUND, &err.to_string());
        }
    }

    let mut body = String::new();
    if ids.is_empty() {
        body.push_str("<p>No test images found.</p>");
    } else {
        let options: String = ids
            .iter()
            .map(|id| {
                let marker = if Some(id) == selected.as_ref() { " selected" } else { "" };
                let id = escape(id);
                format!(r##"<option value="{id}"{marker}>{id}</option>"##)
            })
            .collect();
        body.push_str(&format!(
            r##"<form method="get" action="/">
<label for="id">Image</label>
<select id="id" name="id" onchange="this.form.submit()">
<option value="">-- pick an image --</option>
{options}
</select>
<noscript><button type="submit">Show</button></noscript>
</form>
"##
        ));
    }

    if let Some(id) = selected {
        let id = escape(&id);
        body.push_str(&format!(
            r##"<div class="panels">
{}{}</div>
<form method="post" action="/predict">
<input type="hidden" name="id" value="{id}">
<button type="submit">Run prediction</button>
</form>
"##,
            panel("Reference image", &format!("/images/{id}")),
            panel("Reference mask", &format!("/masks/{id}")),
        ));
    }

    page("Segmentation demo", &body).into_response()
}

/// Run one prediction round trip and render the comparison view.
async fn run_predict(State(state): State<AppState>, Form(form): Form<PredictForm>) -> Response {
    let id = form.id;

    let (image, _) = match state.dataset.load_pair(&id) {
        Ok(pair) => pair,
        Err(err @ (Error::MissingImage { .. } | Error::MissingMask { .. })) => {
            return error_page(StatusCode::NOT_FOUND, &err.to_string())
        }
        Err(err) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    let payload = match codec::encode(&image) {
        Ok(bytes) => bytes,
        Err(err) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    };

    tracing::debug!("requesting prediction for {id} ({} payload bytes)", payload.len());
    let started = Instant::now();
    let mask_png = match state.client.predict(&payload).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("prediction for {id} failed: {err}");
            return error_page(StatusCode::BAD_GATEWAY, &err.to_string());
        }
    };

    // A 200 body is not necessarily a valid PNG.
    let predicted = match codec::decode(&mask_png) {
        Ok(image) => image,
        Err(err) => return error_page(StatusCode::BAD_GATEWAY, &err.to_string()),
    };
    tracing::info!(
        "predicted mask for {id}: {}x{} in {:.1?}",
        predicted.width(),
        predicted.height(),
        started.elapsed()
    );

    let id = escape(&id);
    let encoded = STANDARD.encode(&mask_png);
    let body = format!(
        r##"<p>Image <strong>{id}</strong></p>
<div class="panels">
{}{}{}</div>
<p><a href="/?id={id}">Back to selection</a></p>
"##,
        panel("Reference image", &format!("/images/{id}")),
        panel("Reference mask", &format!("/masks/{id}")),
        panel("Predicted mask", &format!("data:image/png;base64,{encoded}")),
    );
    page("Segmentation result", &body).into_response()
}

async fn image_png(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, StatusCode> {
    let (path, _) = state.dataset.resolve(&id);
    png_file(&id, &path)
}

async fn mask_png(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, StatusCode> {
    let (_, path) = state.dataset.resolve(&id);
    png_file(&id, &path)
}

fn png_file(id: &str, path: &std::path::Path) -> Result<Response, StatusCode> {
    // Ids name files inside the dataset directories, nothing above them.
    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let bytes = std::fs::read(path).map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

fn panel(caption: &str, src: &str) -> String {
    format!(
        r##"<figure class="panel"><img src="{src}" alt="{caption}"><figcaption>{caption}</figcaption></figure>
"##
    )
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.panels {{ display: flex; gap: 1rem; margin: 1rem 0; }}
.panel {{ margin: 0; }}
.panel img {{ max-width: 320px; display: block; border: 1px solid #ccc; }}
.panel figcaption {{ text-align: center; padding-top: 0.5rem; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}</body>
</html>
"##
    ))
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        r##"<p class="error">{}</p>
<p><a href="/">Back to selection</a></p>
"##,
        escape(message)
    );
    (status, page("Error", &body)).into_response()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<img src="x">&'"#),
            "&lt;img src=&quot;x&quot;&gt;&amp;&#39;"
        );
        assert_eq!(escape("img_42"), "img_42");
    }

    #[test]
    fn pages_carry_title_and_body() {
        let Html(html) = page("Segmentation demo", "<p>hello</p>");
        assert!(html.contains("<title>Segmentation demo</title>"));
        assert!(html.contains("<p>hello</p>"));
    }

    #[test]
    fn panels_pair_image_with_caption() {
        let html = panel("Predicted mask", "/masks/img_0");
        assert!(html.contains(r#"src="/masks/img_0""#));
        assert!(html.contains("<figcaption>Predicted mask</figcaption>"));
    }
}
