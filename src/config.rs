//! Loader configuration.

/// Extension conventionally used for slice files.
pub const DEFAULT_EXTENSION: &str = "dcm";

/// Status text shown on the progress indicator during assembly.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading Array";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderOptions {
    /// File extension (without the dot) that marks slice files. Matched
    /// case-insensitively; when no file matches, every file in the directory
    /// is treated as a slice.
    pub extension: String,

    pub loading_message: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            loading_message: DEFAULT_LOADING_MESSAGE.to_string(),
        }
    }
}

impl LoaderOptions {
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }
}
