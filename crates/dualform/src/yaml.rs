//! Utility functions for processing configuration documents in the YAML file format
//!
//! JSON documents are valid YAML documents, so everything in here works for JSON as well.
use std::io::Write;

use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML (de)serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to deserialize YAML"))]
    DeserializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },

    #[snafu(display("key path {path:?} does not exist, {segment:?} could not be found"))]
    MissingKey { path: String, segment: String },
}

/// Provides configurable options during YAML serialization.
///
/// For most people the default implementation [`SerializeOptions::default()`] is sufficient as it
/// enables explicit document and singleton map serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            singleton_map: true,
        }
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: serde::Serialize,
    W: std::io::Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Serializes the given data structure into a YAML [`String`].
pub fn to_string<T>(value: &T, options: SerializeOptions) -> Result<String>
where
    T: serde::Serialize,
{
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, options)?;
    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Deserializes a single YAML (or JSON) document.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    serde_yaml::from_str(input).context(DeserializeYamlSnafu)
}

/// Deserializes a single YAML (or JSON) document from raw bytes.
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    serde_yaml::from_slice(input).context(DeserializeYamlSnafu)
}

/// Parses a single document into a generic node, which can later be decoded into typed values.
pub fn parse_node(input: &str) -> Result<serde_yaml::Value> {
    from_str(input)
}

/// Resolves a dotted key path like `services.web.image` inside `node`.
///
/// Segments index into mappings by key. If the current node is a sequence, the segment is parsed
/// as an index instead. An empty path returns `node` itself.
pub fn lookup<'a>(node: &'a serde_yaml::Value, path: &str) -> Result<&'a serde_yaml::Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(node, |current, segment| {
            let next = match current {
                serde_yaml::Value::Sequence(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                other => other.get(segment),
            };

            next.context(MissingKeySnafu { path, segment })
        })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    enum Connection {
        Inline(String),
    }

    #[derive(Serialize)]
    struct Spec {
        connection: Connection,
    }

    const DOCUMENT: &str = indoc! {"
        services:
          web:
            image: nginx
          workers:
            - image: { tag: v1 }
            - image: worker:v2
    "};

    #[test]
    fn serialize_with_defaults() {
        let spec = Spec {
            connection: Connection::Inline("http://localhost".to_owned()),
        };
        let output = to_string(&spec, SerializeOptions::default()).expect("must serialize");
        assert_eq!(
            output,
            indoc! {"
                ---
                connection:
                  inline: http://localhost
            "}
        );
    }

    #[test]
    fn serialize_without_document_separator() {
        let output = to_string(
            &vec!["a", "b"],
            SerializeOptions {
                explicit_document: false,
                singleton_map: false,
            },
        )
        .expect("must serialize");
        assert_eq!(output, "- a\n- b\n");
    }

    #[test]
    fn lookup_nested_keys() {
        let node = parse_node(DOCUMENT).expect("document must parse");

        let image = lookup(&node, "services.web.image").expect("key must exist");
        assert_eq!(image.as_str(), Some("nginx"));

        let image = lookup(&node, "services.workers.1.image").expect("key must exist");
        assert_eq!(image.as_str(), Some("worker:v2"));

        let root = lookup(&node, "").expect("empty path is the root");
        assert_eq!(root, &node);
    }

    #[test]
    fn lookup_missing_key() {
        let node = parse_node(DOCUMENT).expect("document must parse");

        let err = lookup(&node, "services.db.image").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"key path "services.db.image" does not exist, "db" could not be found"#
        );

        assert!(lookup(&node, "services.workers.5").is_err());
        assert!(lookup(&node, "services.workers.first").is_err());
    }

    #[test]
    fn json_is_yaml() {
        let node = parse_node(r#"{"image": {"tag": "v1"}}"#).expect("JSON must parse");
        let tag = lookup(&node, "image.tag").expect("key must exist");
        assert_eq!(tag.as_str(), Some("v1"));

        let tags: Vec<String> = from_slice(br#"["a", "b"]"#).expect("JSON must parse");
        assert_eq!(tags, ["a", "b"]);
    }
}
