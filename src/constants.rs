//! Capability bits, image requirements, defaults and message texts

// Capability bit constants (one per operation)
pub const LIST: u64 = 1;
pub const RETRIEVE: u64 = 1 << 1;
pub const EXPORT: u64 = 1 << 2;
pub const CREATE: u64 = 1 << 3;
pub const UPDATE: u64 = 1 << 4;
pub const DELETE: u64 = 1 << 5;
pub const REMOVE_SUB: u64 = 1 << 6;

// Composites
pub const READ_ONLY: u64 = LIST | RETRIEVE | EXPORT;
pub const WRITE_ALL: u64 = CREATE | UPDATE | DELETE | REMOVE_SUB;
pub const ALL: u64 = READ_ONLY | WRITE_ALL;

// Image requirements per resource type
pub const BANNER_IMAGE_WIDTH: u32 = 1248;
pub const BANNER_IMAGE_HEIGHT: u32 = 412;
pub const APP_IMAGE_WIDTH: u32 = 512;
pub const APP_IMAGE_HEIGHT: u32 = 512;
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png"];

// Defaults
pub const DEFAULT_CHANGE_FREQUENCY_SECS: u64 = 60;
pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;
pub const NAME_MAX_LEN: usize = 255;
pub const VALID_URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

// Field names
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

// Messages
pub const MSG_UNAUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const MSG_INVALID_TOKEN: &str = "Invalid token.";
pub const MSG_FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const MSG_NOT_FOUND: &str = "Not found.";
pub const MSG_SERVER_ERROR: &str = "A server error occurred.";
pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_INVALID_URL: &str = "Enter a valid URL.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";
pub const MSG_BAD_DURATION: &str =
    "Duration has wrong format. Use one of these formats instead: [DD] [HH:[MM:]]ss[.uuuuuu].";
pub const MSG_DURATION_TOO_SHORT: &str = "Ensure this value is greater than or equal to 0:00:01.";
pub const MSG_ALREADY_MEMBER: &str = "User already belongs to a partner.";
pub const MSG_UNKNOWN_USER: &str = "User does not exist.";

/// `Invalid pk "<value>" - object does not exist.`
pub fn msg_does_not_exist(pk: &str) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

/// Extension rejection naming the offending extension and the allowed set
pub fn msg_bad_extension(ext: &str, allowed: &[&str]) -> String {
    format!(
        "File extension “{}” is not allowed. Allowed extensions are: {}.",
        ext,
        allowed.join(", ")
    )
}

pub fn msg_bad_dimensions(width: u32, height: u32) -> String {
    format!("Image size must be {}x{}px.", width, height)
}

pub fn msg_name_too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

pub fn msg_bad_column(column: &str) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", column)
}
