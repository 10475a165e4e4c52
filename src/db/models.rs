/// A claim row, column name to value. The warehouse owns the schema, so rows
/// are kept as JSON rather than fixed structs: a NULL id or a TIMESTAMPTZ
/// `inserted_at` comes through as-is instead of failing the whole request.
pub type ClaimRecord = serde_json::Map<String, serde_json::Value>;
