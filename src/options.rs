//! Parser configuration.
//!
//! Real-world HTTP traffic strays from RFC 7230 in a handful of well-known
//! ways, so every tolerance is an explicit switch here rather than a
//! hard-coded behavior. The defaults accept bare `\n` line terminators, skip
//! one leading empty line, and default a missing version to HTTP/1.1;
//! everything else is strict.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::header::RawHeaders;

/// A post-parse predicate run over the complete, frozen header set.
///
/// Any error it returns propagates unchanged from header parsing.
pub type HeaderValidator = Arc<dyn Fn(&RawHeaders) -> Result<()> + Send + Sync>;

/// Immutable configuration for [`HttpMetadataParser`](crate::HttpMetadataParser).
///
/// Built once through [`builder`](ParserOptions::builder) and shared freely;
/// a parser holds no other state, so one configured parser value can serve
/// any number of threads.
#[derive(Clone)]
pub struct ParserOptions {
    allow_new_line_without_return: bool,
    ignore_leading_empty_line: bool,
    insert_http_version_if_missing: bool,
    allow_illegal_start_line_characters: bool,
    max_header_name_length: usize,
    max_header_value_length: usize,
    header_validator: Option<HeaderValidator>,
}

impl ParserOptions {
    /// Starts building a configuration from the defaults.
    pub fn builder() -> Builder {
        Builder {
            options: ParserOptions::default(),
        }
    }

    /// Whether a bare `\n` is accepted as a line terminator.
    pub fn allow_new_line_without_return(&self) -> bool {
        self.allow_new_line_without_return
    }

    /// Whether one empty line before the start line is discarded.
    pub fn ignore_leading_empty_line(&self) -> bool {
        self.ignore_leading_empty_line
    }

    /// Whether a two-token request line defaults to HTTP/1.1.
    pub fn insert_http_version_if_missing(&self) -> bool {
        self.insert_http_version_if_missing
    }

    /// Whether illegal bytes in the request target are percent-encoded
    /// instead of rejected.
    pub fn allow_illegal_start_line_characters(&self) -> bool {
        self.allow_illegal_start_line_characters
    }

    /// Upper bound on header-name bytes.
    pub fn max_header_name_length(&self) -> usize {
        self.max_header_name_length
    }

    /// Upper bound on header-value bytes.
    pub fn max_header_value_length(&self) -> usize {
        self.max_header_value_length
    }

    /// The post-parse header predicate, if one was configured.
    pub fn header_validator(&self) -> Option<&HeaderValidator> {
        self.header_validator.as_ref()
    }
}

impl Default for ParserOptions {
    fn default() -> ParserOptions {
        ParserOptions {
            allow_new_line_without_return: true,
            ignore_leading_empty_line: true,
            insert_http_version_if_missing: true,
            allow_illegal_start_line_characters: false,
            max_header_name_length: i32::max_value() as usize,
            max_header_value_length: i32::max_value() as usize,
            header_validator: None,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field(
                "allow_new_line_without_return",
                &self.allow_new_line_without_return,
            )
            .field("ignore_leading_empty_line", &self.ignore_leading_empty_line)
            .field(
                "insert_http_version_if_missing",
                &self.insert_http_version_if_missing,
            )
            .field(
                "allow_illegal_start_line_characters",
                &self.allow_illegal_start_line_characters,
            )
            .field("max_header_name_length", &self.max_header_name_length)
            .field("max_header_value_length", &self.max_header_value_length)
            .field(
                "header_validator",
                &self.header_validator.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

/// A builder for [`ParserOptions`](ParserOptions).
#[derive(Debug, Clone)]
pub struct Builder {
    options: ParserOptions,
}

impl Builder {
    /// Accept a bare `\n` as a line terminator. Default `true`.
    pub fn allow_new_line_without_return(mut self, enabled: bool) -> Builder {
        self.options.allow_new_line_without_return = enabled;
        self
    }

    /// Discard one empty line before the start line. Default `true`.
    pub fn ignore_leading_empty_line(mut self, enabled: bool) -> Builder {
        self.options.ignore_leading_empty_line = enabled;
        self
    }

    /// Default a missing HTTP version to HTTP/1.1. Default `true`.
    pub fn insert_http_version_if_missing(mut self, enabled: bool) -> Builder {
        self.options.insert_http_version_if_missing = enabled;
        self
    }

    /// Percent-encode otherwise-illegal bytes in the request target and
    /// tolerate spaces in it. Default `false`.
    pub fn allow_illegal_start_line_characters(mut self, enabled: bool) -> Builder {
        self.options.allow_illegal_start_line_characters = enabled;
        self
    }

    /// Upper bound on header-name bytes. Default `2^31 - 1`.
    pub fn max_header_name_length(mut self, max: usize) -> Builder {
        self.options.max_header_name_length = max;
        self
    }

    /// Upper bound on header-value bytes. Default `2^31 - 1`.
    pub fn max_header_value_length(mut self, max: usize) -> Builder {
        self.options.max_header_value_length = max;
        self
    }

    /// A predicate invoked with the frozen headers after parsing; any error
    /// it returns propagates unchanged.
    pub fn header_validator<F>(mut self, validator: F) -> Builder
    where
        F: Fn(&RawHeaders) -> Result<()> + Send + Sync + 'static,
    {
        self.options.header_validator = Some(Arc::new(validator));
        self
    }

    /// Freezes the configuration.
    pub fn build(self) -> ParserOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::ParserOptions;

    #[test]
    fn defaults_are_lenient_about_framing_only() {
        let options = ParserOptions::default();
        assert!(options.allow_new_line_without_return());
        assert!(options.ignore_leading_empty_line());
        assert!(options.insert_http_version_if_missing());
        assert!(!options.allow_illegal_start_line_characters());
        assert_eq!(options.max_header_name_length(), i32::max_value() as usize);
        assert_eq!(options.max_header_value_length(), i32::max_value() as usize);
        assert!(options.header_validator().is_none());
    }

    #[test]
    fn builder_overrides_stick() {
        let options = ParserOptions::builder()
            .allow_new_line_without_return(false)
            .insert_http_version_if_missing(false)
            .max_header_name_length(64)
            .build();

        assert!(!options.allow_new_line_without_return());
        assert!(!options.insert_http_version_if_missing());
        assert_eq!(options.max_header_name_length(), 64);
        // untouched switches keep their defaults
        assert!(options.ignore_leading_empty_line());
    }
}
