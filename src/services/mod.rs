pub mod build_types;
pub mod encoding;
pub mod fetch;
pub mod preview;
