pub mod build_type;
pub mod row;
