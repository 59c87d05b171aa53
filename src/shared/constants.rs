/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// DOCUMENT CONSTANTS
// =============================================================================

/// Multipart field carrying the uploaded document
pub const UPLOAD_FIELD_NAME: &str = "contract";

/// Alternate multipart field name accepted for uploads
pub const UPLOAD_FIELD_ALIAS: &str = "file";

/// Total attempts when a concurrent upload claims the same version number
pub const VERSION_INSERT_ATTEMPTS: u32 = 3;

/// Fixed pause between version insert attempts
pub const VERSION_RETRY_DELAY_MS: u64 = 50;

/// Longest filename accepted for uploads, in bytes
pub const MAX_FILENAME_LENGTH: usize = 255;
