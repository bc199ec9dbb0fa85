pub mod mapping_response;
