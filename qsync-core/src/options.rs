//! Codec and sync options
//!
//! All option structs deserialize with defaults for missing fields so they can
//! be embedded in an application's own config file.

use serde::{Deserialize, Serialize};

/// How arrays are laid out in a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    /// `tag=a&tag=b`
    #[default]
    None,
    /// `tag[]=a&tag[]=b`
    Bracket,
    /// `tag[0]=a&tag[1]=b`
    Index,
    /// `tag=a,b`
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub array_format: ArrayFormat,
    /// Turn finite numeric values into JSON numbers
    pub parse_numbers: bool,
    /// Turn `true` / `false` into JSON booleans
    pub parse_booleans: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringifyOptions {
    pub array_format: ArrayFormat,
    /// Emit keys in sorted order
    pub sort: bool,
    pub skip_empty_string: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            array_format: ArrayFormat::None,
            sort: true,
            skip_empty_string: false,
        }
    }
}

/// Setup-time options, fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryStringOptions {
    pub parse: ParseOptions,
    pub stringify: StringifyOptions,
}

/// Per-call options for `set_query_string`.
///
/// `stringify`, when present, replaces the setup-time stringify options for
/// this call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetQueryStringOptions {
    /// Update the held state without navigating
    pub state_only: bool,
    pub stringify: Option<StringifyOptions>,
}

impl SetQueryStringOptions {
    pub fn state_only() -> Self {
        Self {
            state_only: true,
            stringify: None,
        }
    }

    pub fn with_stringify(stringify: StringifyOptions) -> Self {
        Self {
            state_only: false,
            stringify: Some(stringify),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = QueryStringOptions::default();
        assert_eq!(options.parse.array_format, ArrayFormat::None);
        assert!(!options.parse.parse_numbers);
        assert!(!options.parse.parse_booleans);
        assert!(options.stringify.sort);
        assert!(!options.stringify.skip_empty_string);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let options: QueryStringOptions = serde_json::from_str(
            r#"{ "parse": { "array_format": "bracket", "parse_numbers": true } }"#,
        )
        .unwrap();
        assert_eq!(options.parse.array_format, ArrayFormat::Bracket);
        assert!(options.parse.parse_numbers);
        assert!(!options.parse.parse_booleans);
        assert_eq!(options.stringify, StringifyOptions::default());
    }

    #[test]
    fn test_set_options_constructors() {
        assert!(SetQueryStringOptions::state_only().state_only);
        let opts = SetQueryStringOptions::with_stringify(StringifyOptions {
            sort: false,
            ..Default::default()
        });
        assert!(!opts.state_only);
        assert_eq!(opts.stringify.map(|s| s.sort), Some(false));
    }
}
