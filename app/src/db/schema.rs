// shoebox_admin/src/db/schema.rs

use sqlx::PgPool;
use tracing::instrument;

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
  id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
  name         TEXT NOT NULL,
  brand        TEXT NOT NULL,
  category     TEXT NOT NULL,
  description  TEXT NOT NULL,
  price        NUMERIC(10, 2) NOT NULL,
  features     TEXT[],
  image        TEXT,
  images       TEXT[],
  sizes        TEXT[],
  colors       TEXT[],
  rating       NUMERIC(3, 2) NOT NULL DEFAULT 0,
  review_count INTEGER NOT NULL DEFAULT 0,
  in_stock     BOOLEAN NOT NULL DEFAULT TRUE,
  is_new       BOOLEAN NOT NULL DEFAULT TRUE,
  created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Creates the `products` table when it does not exist yet. Existing tables are left untouched.
#[instrument(name = "db::ensure_schema", skip_all, err(Display))]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  sqlx::query(CREATE_PRODUCTS).execute(pool).await?;
  tracing::info!("Products table is in place.");
  Ok(())
}
