// shoebox_admin/src/models/mod.rs
pub mod product_row;
