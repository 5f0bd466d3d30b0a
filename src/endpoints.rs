//! The API endpoints URIs.

/// The root route which redirects to the import page.
pub const ROOT: &str = "/";
/// The page for importing transactions from bank statements.
pub const IMPORT_VIEW: &str = "/import";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to preview the records parsed from an uploaded statement.
pub const IMPORT_PREVIEW: &str = "/api/import/preview";
/// The route to import the previewed statement records.
pub const IMPORT: &str = "/api/import";
