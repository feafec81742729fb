/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

/// Role identifier that bypasses fine-grained authorization checks.
pub const SUPER_ADMIN_AUTHORITY_ID: &str = "888";

/// Parent key shared by every top-level role and menu entry.
pub const ROOT_PARENT_ID: &str = "0";

/// Landing route assigned to roles created without one.
pub const DEFAULT_ROUTER: &str = "dashboard";

pub const BEARER_PREFIX: &str = "Bearer ";

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Response codes carried in the JSON envelope.
pub const RESPONSE_CODE_SUCCESS: i32 = 0;
pub const RESPONSE_CODE_ERROR: i32 = 7;
