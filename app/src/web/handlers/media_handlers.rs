// shoebox_admin/src/web/handlers/media_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use tracing::{instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// Serves an object written by the directory image store.
#[instrument(name = "handler::serve_media", skip(app_state, path), fields(key = %path.as_ref()))]
pub async fn serve_media_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let key = path.into_inner();
  let Some(media) = app_state.media.as_ref() else {
    return Err(AppError::NotFound("Images are embedded in product records; there is no media store.".to_string()));
  };

  match media.open(&key).await? {
    Some((bytes, content_type)) => Ok(
      HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes),
    ),
    None => {
      warn!("Media object not found.");
      Err(AppError::NotFound(format!("Media object '{}' not found.", key)))
    }
  }
}

const PLACEHOLDER_DEFAULT_SIDE: u32 = 300;
const PLACEHOLDER_MAX_SIDE: u32 = 4000;

fn placeholder_side(raw: &str) -> u32 {
  match raw.trim().parse::<u32>() {
    Ok(0) | Err(_) => PLACEHOLDER_DEFAULT_SIDE,
    Ok(side) => side.min(PLACEHOLDER_MAX_SIDE),
  }
}

/// Grey SVG stand-in for products without an image. Unparsable sides fall back to 300.
pub async fn placeholder_handler(path: web::Path<(String, String)>) -> HttpResponse {
  let (width, height) = path.into_inner();
  let (width, height) = (placeholder_side(&width), placeholder_side(&height));
  let svg = format!(
    "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\">\
     <rect width=\"100%\" height=\"100%\" fill=\"#f0f0f0\"/>\
     <text x=\"50%\" y=\"50%\" font-family=\"Arial\" font-size=\"16\" fill=\"#888\" \
     text-anchor=\"middle\" dominant-baseline=\"middle\">{w}\u{00d7}{h}</text></svg>",
    w = width,
    h = height
  );
  HttpResponse::Ok()
    .content_type("image/svg+xml")
    .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
    .body(svg)
}
