/// Quota granted to every new account, in megabytes
pub const DEFAULT_STORAGE_LIMIT_MB: i64 = 1024;

/// Number of files shown in the dashboard's "recent" list
pub const RECENT_FILES_LIMIT: i64 = 10;

/// Longest accepted file or folder name
pub const MAX_ITEM_NAME_LEN: usize = 255;

// =============================================================================
// COOKIES
// =============================================================================

/// Cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "cloud_drive_session";

/// Read-once cookie carrying a message for the next rendered page
pub const FLASH_COOKIE: &str = "cloud_drive_flash";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

pub const ROLE_ADMIN: &str = "Admin";

pub const ROLE_USER: &str = "User";
