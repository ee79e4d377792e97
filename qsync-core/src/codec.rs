//! Query codec and the adapter that turns parsed query data into app state

use crate::error::{CodecError, SyncError};
use crate::options::{ArrayFormat, ParseOptions, QueryStringOptions, StringifyOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Decoded query parameters, keyed by parameter name.
pub type QueryData = Map<String, Value>;

/// Converts between query strings and key/value mappings.
pub trait QueryCodec {
    fn parse(&self, query: &str, options: &ParseOptions) -> Result<QueryData, CodecError>;
    fn stringify(&self, data: &QueryData, options: &StringifyOptions)
        -> Result<String, CodecError>;
}

/// `application/x-www-form-urlencoded` codec backed by `serde_urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedCodec;

impl QueryCodec for UrlEncodedCodec {
    fn parse(&self, query: &str, options: &ParseOptions) -> Result<QueryData, CodecError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;

        let mut data = QueryData::new();
        let mut indexed: BTreeMap<String, Vec<(usize, Value)>> = BTreeMap::new();

        for (key, raw) in pairs {
            match options.array_format {
                ArrayFormat::None => merge_value(&mut data, key, decode_scalar(raw, options)),
                ArrayFormat::Bracket => match key.strip_suffix("[]") {
                    Some(name) => {
                        let value = Value::Array(vec![decode_scalar(raw, options)]);
                        merge_value(&mut data, name.to_string(), value);
                    }
                    None => merge_value(&mut data, key, decode_scalar(raw, options)),
                },
                ArrayFormat::Index => match split_index(&key) {
                    Some((name, index)) => indexed
                        .entry(name.to_string())
                        .or_default()
                        .push((index, decode_scalar(raw, options))),
                    None => merge_value(&mut data, key, decode_scalar(raw, options)),
                },
                ArrayFormat::Comma => {
                    let value = if raw.contains(',') {
                        Value::Array(
                            raw.split(',')
                                .map(|part| decode_scalar(part.to_string(), options))
                                .collect(),
                        )
                    } else {
                        decode_scalar(raw, options)
                    };
                    merge_value(&mut data, key, value);
                }
            }
        }

        for (name, mut items) in indexed {
            items.sort_by_key(|(index, _)| *index);
            let values = Value::Array(items.into_iter().map(|(_, v)| v).collect());
            merge_value(&mut data, name, values);
        }

        Ok(data)
    }

    fn stringify(
        &self,
        data: &QueryData,
        options: &StringifyOptions,
    ) -> Result<String, CodecError> {
        let mut entries: Vec<(&String, &Value)> = data.iter().collect();
        if options.sort {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }

        let mut pairs: Vec<(String, String)> = Vec::new();
        for (key, value) in entries {
            match value {
                Value::Array(items) => {
                    let mut texts = Vec::with_capacity(items.len());
                    for item in items {
                        if let Some(text) = encode_scalar(key, item, options)? {
                            texts.push(text);
                        }
                    }
                    push_array(&mut pairs, key, texts, options.array_format);
                }
                other => {
                    if let Some(text) = encode_scalar(key, other, options)? {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }

        Ok(serde_urlencoded::to_string(&pairs)?)
    }
}

/// Add a value under `key`, turning repeated keys into an array.
fn merge_value(data: &mut QueryData, key: String, value: Value) {
    match data.get_mut(&key) {
        None => {
            data.insert(key, value);
        }
        Some(Value::Array(existing)) => match value {
            Value::Array(items) => existing.extend(items),
            single => existing.push(single),
        },
        Some(existing) => {
            let first = existing.take();
            let mut items = vec![first];
            match value {
                Value::Array(more) => items.extend(more),
                single => items.push(single),
            }
            *existing = Value::Array(items);
        }
    }
}

/// `tag[3]` -> `("tag", 3)`
fn split_index(key: &str) -> Option<(&str, usize)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let index = inner[open + 1..].parse().ok()?;
    Some((&inner[..open], index))
}

fn decode_scalar(raw: String, options: &ParseOptions) -> Value {
    if options.parse_booleans {
        if raw.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
    }

    if options.parse_numbers && !raw.trim().is_empty() {
        if let Ok(int) = raw.trim().parse::<i64>() {
            return Value::Number(int.into());
        }
        if let Some(number) = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
        {
            return Value::Number(number);
        }
    }

    Value::String(raw)
}

/// Text for a single value, or `None` when the value is omitted.
fn encode_scalar(
    key: &str,
    value: &Value,
    options: &StringifyOptions,
) -> Result<Option<String>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() && options.skip_empty_string => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(CodecError::UnsupportedValue {
            key: key.to_string(),
        }),
    }
}

fn push_array(
    pairs: &mut Vec<(String, String)>,
    key: &str,
    texts: Vec<String>,
    format: ArrayFormat,
) {
    match format {
        ArrayFormat::None => pairs.extend(texts.into_iter().map(|t| (key.to_string(), t))),
        ArrayFormat::Bracket => pairs.extend(texts.into_iter().map(|t| (format!("{key}[]"), t))),
        ArrayFormat::Index => pairs.extend(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, t)| (format!("{key}[{i}]"), t)),
        ),
        ArrayFormat::Comma => {
            if !texts.is_empty() {
                pairs.push((key.to_string(), texts.join(",")));
            }
        }
    }
}

/// Turns parsed query data into application state.
pub type Transform<T> = Rc<dyn Fn(QueryData) -> T>;

/// Setup-time configuration: how parsed data becomes `T`, and the codec options.
pub struct QueryStringConfig<T> {
    transform: Transform<T>,
    options: QueryStringOptions,
}

impl QueryStringConfig<QueryData> {
    /// No transform: the parsed mapping is the state.
    pub fn raw() -> Self {
        Self {
            transform: Rc::new(|data| data),
            options: QueryStringOptions::default(),
        }
    }
}

impl Default for QueryStringConfig<QueryData> {
    fn default() -> Self {
        Self::raw()
    }
}

impl<T> QueryStringConfig<T> {
    pub fn with_transform(transform: impl Fn(QueryData) -> T + 'static) -> Self {
        Self {
            transform: Rc::new(transform),
            options: QueryStringOptions::default(),
        }
    }

    pub fn options(mut self, options: QueryStringOptions) -> Self {
        self.options = options;
        self
    }

    pub fn query_options(&self) -> &QueryStringOptions {
        &self.options
    }
}

impl<T: DeserializeOwned + Default> QueryStringConfig<T> {
    /// Deserialize the parsed mapping into `T`.
    ///
    /// Query data that does not fit `T` yields `T::default()`.
    pub fn typed() -> Self {
        Self::with_transform(|data| {
            serde_json::from_value(Value::Object(data)).unwrap_or_else(|err| {
                warn!("Query string does not match {}: {err}", std::any::type_name::<T>());
                T::default()
            })
        })
    }
}

impl<T> Clone for QueryStringConfig<T> {
    fn clone(&self) -> Self {
        Self {
            transform: Rc::clone(&self.transform),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryStringConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStringConfig")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Codec plus setup-time configuration.
///
/// Codec failures are returned as-is; nothing here retries or falls back.
pub struct QueryAdapter<T, C = UrlEncodedCodec> {
    codec: C,
    config: QueryStringConfig<T>,
}

impl<T> QueryAdapter<T> {
    pub fn new(config: QueryStringConfig<T>) -> Self {
        Self::with_codec(UrlEncodedCodec, config)
    }
}

impl<T, C: QueryCodec> QueryAdapter<T, C> {
    pub fn with_codec(codec: C, config: QueryStringConfig<T>) -> Self {
        Self { codec, config }
    }

    pub fn parse(&self, query: &str) -> Result<T, SyncError> {
        let data = self.codec.parse(query, &self.config.options.parse)?;
        Ok((self.config.transform)(data))
    }

    /// Encode `state` as a query string body (no leading `?`).
    ///
    /// `options` overrides the setup-time stringify options when given.
    pub fn stringify<S: Serialize + ?Sized>(
        &self,
        state: &S,
        options: Option<&StringifyOptions>,
    ) -> Result<String, SyncError> {
        let Value::Object(data) = serde_json::to_value(state)? else {
            return Err(SyncError::NotAnObject);
        };
        let options = options.unwrap_or(&self.config.options.stringify);
        Ok(self.codec.stringify(&data, options)?)
    }

    pub fn config(&self) -> &QueryStringConfig<T> {
        &self.config
    }
}
