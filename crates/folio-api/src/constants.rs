// --- Blob containers ---

/// Container holding image attachments.
pub const IMAGES_CONTAINER: &str = "images";

/// Container holding text attachments.
pub const DOCUMENTS_CONTAINER: &str = "documents";

// --- Validation limits ---

/// Maximum length of a timeline item title (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a timeline item description (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Maximum length of a visitor's name (in characters).
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a visitor message body (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 5000;
