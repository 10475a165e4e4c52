/// Build version. Release pipelines stamp it through `APP_VERSION`; local
/// builds fall back to the crate version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(stamped) => stamped,
    None => env!("CARGO_PKG_VERSION"),
};

pub const SERVICE_NAME: &str = "AICP Claims API";
