pub mod claims_routes;
pub mod health_routes;
