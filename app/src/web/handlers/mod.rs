// shoebox_admin/src/web/handlers/mod.rs

pub mod media_handlers;
pub mod product_handlers;
