// shoebox_admin/src/web/forms.rs

//! Request bodies for product writes: JSON, or `multipart/form-data` with
//! image file parts.

use actix_multipart::Multipart;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use shoebox::{CatalogError, CatalogResult, ImageUploads, IncomingFile, NewProduct, ProductChanges};
use std::collections::HashMap;
use std::str::FromStr;

const MAIN_IMAGE_PART: &str = "imageFile";
const ADDITIONAL_IMAGES_PART: &str = "imageFiles";

/// Bounds on what one multipart request may buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
  /// Largest single part.
  pub part_bytes: usize,
  /// Sum of every part in the request.
  pub total_bytes: usize,
  /// Image file parts, main and additional together.
  pub files: usize,
}

pub enum ProductBody<T> {
  Json(T),
  Form(ProductForm),
}

/// Reads the body as multipart when the request says so, as JSON otherwise.
pub async fn read_product_body<T>(
  req: &HttpRequest,
  payload: web::Payload,
  limits: UploadLimits,
) -> CatalogResult<ProductBody<T>>
where
  T: DeserializeOwned + 'static,
{
  let content_type = req
    .headers()
    .get(actix_web::http::header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("");
  let mut payload = payload.into_inner();

  if content_type.to_ascii_lowercase().starts_with("multipart/form-data") {
    let multipart = Multipart::new(req.headers(), payload);
    return ProductForm::read(multipart, limits).await.map(ProductBody::Form);
  }

  let json = web::Json::<T>::from_request(req, &mut payload)
    .await
    .map_err(|e| invalid(format!("Invalid JSON payload: {}", e)))?;
  Ok(ProductBody::Json(json.into_inner()))
}

fn invalid(message: impl Into<String>) -> CatalogError {
  CatalogError::Validation(message.into())
}

/// Text fields by name (every value, in arrival order) plus the image parts.
#[derive(Debug, Default)]
pub struct ProductForm {
  fields: HashMap<String, Vec<String>>,
  pub uploads: ImageUploads,
}

impl ProductForm {
  pub async fn read(mut multipart: Multipart, limits: UploadLimits) -> CatalogResult<Self> {
    let mut form = ProductForm::default();
    let mut total_bytes = 0usize;
    let mut files = 0usize;

    while let Some(mut field) = multipart
      .try_next()
      .await
      .map_err(|e| invalid(format!("Malformed multipart body: {}", e)))?
    {
      let name = field.name().unwrap_or_default().to_string();
      let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string);
      let content_type = field.content_type().map(|m| m.essence_str().to_string());
      let is_file = name == MAIN_IMAGE_PART || name == ADDITIONAL_IMAGES_PART;

      let mut bytes = Vec::new();
      while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| invalid(format!("Failed reading field '{}': {}", name, e)))?
      {
        if bytes.len() + chunk.len() > limits.part_bytes {
          return Err(invalid(format!(
            "Field '{}' exceeds the upload limit of {} bytes",
            name, limits.part_bytes
          )));
        }
        total_bytes += chunk.len();
        if total_bytes > limits.total_bytes {
          return Err(invalid(format!(
            "Request exceeds the total upload limit of {} bytes",
            limits.total_bytes
          )));
        }
        bytes.extend_from_slice(&chunk);
      }

      if is_file {
        // Browsers send an empty part for an untouched file input.
        if bytes.is_empty() {
          continue;
        }
        files += 1;
        if files > limits.files {
          return Err(invalid(format!("At most {} image files may be uploaded at once", limits.files)));
        }
        let file = IncomingFile::new(
          file_name.unwrap_or_else(|| name.clone()),
          content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
          bytes,
        );
        if name == MAIN_IMAGE_PART {
          form.uploads.main = Some(file);
        } else {
          form.uploads.additional.push(file);
        }
        continue;
      }

      let value = String::from_utf8(bytes).map_err(|_| invalid(format!("Field '{}' is not valid UTF-8", name)))?;
      form.fields.entry(name).or_default().push(value);
    }

    Ok(form)
  }

  /// Last value sent for `name`.
  fn text(&self, name: &str) -> Option<&str> {
    self.fields.get(name).and_then(|values| values.last()).map(String::as_str)
  }

  /// Every value sent for `name`, each split on newlines. `None` when the field was not sent.
  fn list(&self, name: &str) -> Option<Vec<String>> {
    self.fields.get(name).map(|values| {
      values
        .iter()
        .flat_map(|v| v.lines())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
    })
  }

  fn parsed<T>(&self, name: &str) -> CatalogResult<Option<T>>
  where
    T: FromStr,
    T::Err: std::fmt::Display,
  {
    match self.text(name).map(str::trim).filter(|v| !v.is_empty()) {
      Some(raw) => raw
        .parse::<T>()
        .map(Some)
        .map_err(|e| invalid(format!("{} is not a valid value: {}", name, e))),
      None => Ok(None),
    }
  }

  fn flag(&self, name: &str) -> CatalogResult<Option<bool>> {
    match self.text(name).map(|v| v.trim().to_ascii_lowercase()) {
      None => Ok(None),
      Some(v) if v.is_empty() => Ok(None),
      Some(v) => match v.as_str() {
        "true" | "on" | "1" | "yes" => Ok(Some(true)),
        "false" | "off" | "0" | "no" => Ok(Some(false)),
        _ => Err(invalid(format!("{} must be true or false", name))),
      },
    }
  }

  pub fn into_new_product(self) -> CatalogResult<(NewProduct, ImageUploads)> {
    let draft = NewProduct {
      name: self.text("name").unwrap_or_default().to_string(),
      brand: self.text("brand").unwrap_or_default().to_string(),
      category: self.text("category").unwrap_or_default().to_string(),
      price: self
        .parsed::<Decimal>("price")?
        .ok_or_else(|| invalid("price is required"))?,
      description: self.text("description").unwrap_or_default().to_string(),
      features: self.list("features").unwrap_or_default(),
      image: self.text("image").map(str::to_string),
      images: self.list("images").unwrap_or_default(),
      sizes: self.list("sizes").unwrap_or_default(),
      colors: self.list("colors").unwrap_or_default(),
      rating: self.parsed("rating")?,
      review_count: self.parsed("reviewCount")?,
      in_stock: self.flag("inStock")?,
      is_new: self.flag("isNew")?,
    };
    Ok((draft, self.uploads))
  }

  pub fn into_changes(self) -> CatalogResult<(ProductChanges, ImageUploads)> {
    let changes = ProductChanges {
      name: self.text("name").map(str::to_string),
      brand: self.text("brand").map(str::to_string),
      category: self.text("category").map(str::to_string),
      price: self.parsed("price")?,
      description: self.text("description").map(str::to_string),
      features: self.list("features"),
      image: self.text("image").map(str::to_string),
      images: self.list("images"),
      sizes: self.list("sizes"),
      colors: self.list("colors"),
      rating: self.parsed("rating")?,
      review_count: self.parsed("reviewCount")?,
      in_stock: self.flag("inStock")?,
      is_new: self.flag("isNew")?,
    };
    Ok((changes, self.uploads))
  }
}
