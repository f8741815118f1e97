/// Default inventory API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.mackerelio.com";

/// Default web console used for deep links
pub const DEFAULT_WEB_BASE: &str = "https://mackerel.io";

/// Header carrying the inventory API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Inventory API paths
pub const HOSTS_PATH: &str = "/api/v0/hosts";
pub const ORG_PATH: &str = "/api/v0/org";

/// Query parameter used once per requested host status
pub const STATUS_PARAM: &str = "status";

/// Separator between service and role in a role full name
pub const ROLE_SEPARATOR: char = ':';

/// Status API path prefix
pub const API_PREFIX: &str = "/v1";
