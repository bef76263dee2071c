//! Relative endpoint names, appended to the area base URLs.

// Auth area
pub const SIGNUP: &str = "signup";
pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const CURRENT_USER: &str = "current-user";
pub const UPDATE_PROFILE: &str = "update";
pub const REFRESH_TOKEN: &str = "refresh-token";
pub const CSRF_TOKEN: &str = "csrf-token";

// Url area
pub const SHORTEN: &str = "shorten";
pub const CUSTOM_SHORTEN: &str = "custom-shorten";
pub const ANALYTICS: &str = "analytics";

// User area
pub const URLS: &str = "urls";
