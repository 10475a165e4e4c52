pub mod claims_service;

pub use claims_service::RedshiftStore;
