// shoebox_admin/src/web/handlers/product_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use shoebox::{CatalogResult, DeleteOutcome, ImageUploads, ListOutcome, NewProduct, Product, ProductChanges, WriteOutcome};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{status_for, AppError};
use crate::state::AppState;
use crate::web::forms::{read_product_body, ProductBody};

/// Wraps a write result in its envelope. Failures take the status of their kind.
fn write_response(success: StatusCode, result: CatalogResult<Product>) -> HttpResponse {
  let outcome = WriteOutcome::from(result);
  let status = outcome.error.as_ref().map_or(success, |f| status_for(f.kind));
  HttpResponse::build(status).json(outcome)
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let outcome = ListOutcome::from(app_state.catalog.list().await);
  let status = outcome.error.as_ref().map_or(StatusCode::OK, |f| status_for(f.kind));
  info!(count = outcome.products.len(), "Products listed.");
  HttpResponse::build(status).json(outcome)
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.get(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

async fn create_product(app_state: &AppState, req: &HttpRequest, payload: web::Payload) -> CatalogResult<Product> {
  let (draft, uploads) =
    match read_product_body::<NewProduct>(req, payload, app_state.config.upload_limits()).await? {
      ProductBody::Json(draft) => (draft, ImageUploads::default()),
      ProductBody::Form(form) => form.into_new_product()?,
    };
  app_state.writer.create(draft.validate()?, uploads).await
}

#[instrument(name = "handler::create_product", skip_all)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Payload,
) -> HttpResponse {
  write_response(StatusCode::CREATED, create_product(&app_state, &req, payload).await)
}

async fn update_product(
  app_state: &AppState,
  id: Uuid,
  req: &HttpRequest,
  payload: web::Payload,
) -> CatalogResult<Product> {
  let (changes, uploads) =
    match read_product_body::<ProductChanges>(req, payload, app_state.config.upload_limits()).await? {
      ProductBody::Json(changes) => (changes, ImageUploads::default()),
      ProductBody::Form(form) => form.into_changes()?,
    };
  app_state.writer.update(id, changes.validate()?, uploads).await
}

#[instrument(name = "handler::update_product", skip(app_state, req, payload, path), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req: HttpRequest,
  payload: web::Payload,
) -> HttpResponse {
  let id = path.into_inner();
  write_response(StatusCode::OK, update_product(&app_state, id, &req, payload).await)
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
  let outcome = DeleteOutcome::from(app_state.catalog.delete_by_id(path.into_inner()).await);
  let status = outcome.error.as_ref().map_or(StatusCode::OK, |f| status_for(f.kind));
  HttpResponse::build(status).json(outcome)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::web::configure_app_routes;
  use actix_web::{test, App};
  use image::{DynamicImage, ImageFormat, RgbImage};
  use serde_json::Value;
  use shoebox::MemoryProductStore;
  use std::io::Cursor;
  use std::sync::Arc;

  fn state() -> AppState {
    AppState::build(Arc::new(AppConfig::for_tests()), Arc::new(MemoryProductStore::new()))
  }

  fn air_max() -> Value {
    json!({
      "name": "Air Max 270",
      "brand": "Nike",
      "category": "Running",
      "price": "150.00",
      "description": "Max Air heel unit.",
      "features": ["Max Air unit"],
      "sizes": ["8", "9"],
      "colors": ["Black"]
    })
  }

  fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
  }

  fn multipart_body(boundary: &str, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
      body.extend_from_slice(
        format!(
          "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
          boundary, name, value
        )
        .as_bytes(),
      );
    }
    for (name, file_name, bytes) in files {
      body.extend_from_slice(
        format!(
          "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
          boundary, name, file_name
        )
        .as_bytes(),
      );
      body.extend_from_slice(bytes);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
  }

  #[actix_web::test]
  async fn json_create_applies_defaults() {
    let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure_app_routes)).await;

    let req = test::TestRequest::post().uri("/api/v1/products").set_json(air_max()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["product"]["rating"], json!("0"));
    assert_eq!(body["product"]["reviewCount"], json!(0));
    assert_eq!(body["product"]["inStock"], json!(true));
    assert_eq!(body["product"]["isNew"], json!(true));
    assert_eq!(body["product"]["image"], Value::Null);
  }

  #[actix_web::test]
  async fn invalid_create_reports_validation_error() {
    let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure_app_routes)).await;

    let mut draft = air_max();
    draft["name"] = json!("   ");
    let req = test::TestRequest::post().uri("/api/v1/products").set_json(draft).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"], Value::Null);
    assert_eq!(body["error"]["kind"], json!("ValidationError"));
  }

  #[actix_web::test]
  async fn multipart_create_stores_downscaled_image() {
    let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure_app_routes)).await;

    let boundary = "shoeboxboundary";
    let png = png_bytes(1200, 600);
    let body = multipart_body(
      boundary,
      &[
        ("name", "Ultraboost 22"),
        ("brand", "Adidas"),
        ("category", "Running"),
        ("price", "189.99"),
        ("description", "Endless energy."),
        ("features", "Boost midsole\nPrimeknit upper"),
        ("sizes", "9"),
        ("sizes", "10"),
      ],
      &[("imageFile", "ultraboost.png", &png)],
    );
    let req = test::TestRequest::post()
      .uri("/api/v1/products")
      .insert_header(("content-type", format!("multipart/form-data; boundary={}", boundary)))
      .set_payload(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let product = &body["product"];
    assert_eq!(product["features"], json!(["Boost midsole", "Primeknit upper"]));
    assert_eq!(product["sizes"], json!(["9", "10"]));
    let reference = product["image"].as_str().unwrap();
    let (_, bytes) = shoebox::EmbeddedImageStore::decode_reference(reference).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 400);
  }

  #[actix_web::test]
  async fn update_then_delete_round() {
    let state = state();
    let app = test::init_service(App::new().app_data(web::Data::new(state.clone())).configure(configure_app_routes)).await;
    let draft: NewProduct = serde_json::from_value(air_max()).unwrap();
    let created = state.writer.create(draft, ImageUploads::default()).await.unwrap();
    let uri = format!("/api/v1/products/{}", created.id);

    let req = test::TestRequest::put().uri(&uri).set_json(json!({ "price": "99.99" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"]["price"], json!("99.99"));
    assert_eq!(body["product"]["name"], json!("Air Max 270"));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true }));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["kind"], json!("NotFound"));
  }

  #[actix_web::test]
  async fn update_flips_stock_and_flags() {
    let state = state();
    let app = test::init_service(App::new().app_data(web::Data::new(state.clone())).configure(configure_app_routes)).await;
    let draft: NewProduct = serde_json::from_value(air_max()).unwrap();
    let created = state.writer.create(draft, ImageUploads::default()).await.unwrap();
    let uri = format!("/api/v1/products/{}", created.id);

    let req = test::TestRequest::put()
      .uri(&uri)
      .set_json(json!({ "inStock": false, "reviewCount": 7, "rating": "4.5" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"]["inStock"], json!(false));
    assert_eq!(body["product"]["isNew"], json!(true));
    assert_eq!(body["product"]["reviewCount"], json!(7));
    assert_eq!(body["product"]["rating"], json!("4.5"));

    let boundary = "shoeboxboundary";
    let req = test::TestRequest::put()
      .uri(&uri)
      .insert_header(("content-type", format!("multipart/form-data; boundary={}", boundary)))
      .set_payload(multipart_body(boundary, &[("isNew", "false"), ("inStock", "true")], &[]))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"]["inStock"], json!(true));
    assert_eq!(body["product"]["isNew"], json!(false));
  }

  #[actix_web::test]
  async fn too_many_image_files_are_rejected() {
    let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure_app_routes)).await;

    let boundary = "shoeboxboundary";
    let png = png_bytes(8, 8);
    let files: Vec<(&str, &str, &[u8])> = (0..5).map(|_| ("imageFiles", "swatch.png", png.as_slice())).collect();
    let body = multipart_body(
      boundary,
      &[
        ("name", "Chuck Taylor"),
        ("brand", "Converse"),
        ("category", "Lifestyle"),
        ("price", "60.00"),
        ("description", "Canvas classic."),
      ],
      &files,
    );
    let req = test::TestRequest::post()
      .uri("/api/v1/products")
      .insert_header(("content-type", format!("multipart/form-data; boundary={}", boundary)))
      .set_payload(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["kind"], json!("ValidationError"));
    assert!(body["error"]["message"].as_str().unwrap().contains("image files"));
  }

  #[actix_web::test]
  async fn oversized_price_is_a_validation_error() {
    let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure_app_routes)).await;

    let mut draft = air_max();
    draft["price"] = json!("100000000.00");
    let req = test::TestRequest::post().uri("/api/v1/products").set_json(draft).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn list_and_get_read_the_catalog() {
    let state = state();
    let app = test::init_service(App::new().app_data(web::Data::new(state.clone())).configure(configure_app_routes)).await;
    let draft: NewProduct = serde_json::from_value(air_max()).unwrap();
    let created = state.writer.create(draft, ImageUploads::default()).await.unwrap();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/products").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/products/{}", created.id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["product"]["id"], json!(created.id.to_string()));

    let missing = format!("/api/v1/products/{}", Uuid::new_v4());
    let resp = test::call_service(&app, test::TestRequest::get().uri(&missing).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
