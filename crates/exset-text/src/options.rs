//! Text codec configuration.

use exset_model::FormatVersion;

/// Producer name written to the `source` header field.
pub const DEFAULT_SOURCE: &str = "RapidMiner Python Scripting Extension and Library";

/// Producer module written to the `module` header field.
pub const DEFAULT_MODULE: &str = "Python";

/// Options for the CSV + metadata codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCodecOptions {
    /// `source` header value.
    pub source: String,
    /// `module` header value.
    pub module: String,
    /// Library version recorded in the header and compared on read.
    pub version: FormatVersion,
    /// Truncate `time` values to the day and `date` values to whole days,
    /// matching the precision of the binary table format.
    pub date_time_compat: bool,
}

impl Default for TextCodecOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            module: DEFAULT_MODULE.to_string(),
            version: FormatVersion::current(),
            date_time_compat: false,
        }
    }
}

impl TextCodecOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version written to the header.
    #[must_use]
    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the `source` header value.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the `module` header value.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Enable or disable date/time truncation for table-format compatibility.
    #[must_use]
    pub fn with_date_time_compat(mut self, enabled: bool) -> Self {
        self.date_time_compat = enabled;
        self
    }
}
