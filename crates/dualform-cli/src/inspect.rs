//! The `inspect` subcommand: reports whether a value is written as a scalar, a sequence or a
//! mapping.
//!
//! The value is decoded into [`Inspected`], a nested [`BasicOrAdvanced`]. The shorthand shapes
//! (scalar, then sequence of scalars) are tried first, mappings last.
use std::{borrow::Cow, path::PathBuf};

use dualform::{
    BasicOrAdvanced, Emptiness,
    yaml::{self, SerializeOptions},
};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Unexpected},
};
use serde_yaml::Value;
use snafu::{ResultExt, Snafu};
use strum::Display;
use tracing::{debug, info};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read document"))]
    ReadDocument { source: std::io::Error },

    #[snafu(display("failed to parse document"))]
    ParseDocument { source: yaml::Error },

    #[snafu(display("failed to resolve key path"))]
    ResolvePath { source: yaml::Error },

    #[snafu(display("failed to decode value at {path:?}"))]
    DecodeValue {
        source: dualform::DecodeError,
        path: String,
    },

    #[snafu(display("failed to encode value"))]
    EncodeValue { source: dualform::EncodeError },

    #[snafu(display("failed to serialize normalized value"))]
    SerializeValue { source: yaml::Error },
}

#[derive(Debug, clap::Args)]
pub struct InspectArguments {
    /// Path to the YAML or JSON document.
    pub file: PathBuf,

    /// Dotted key path of the value to inspect, for example `services.web.image`.
    ///
    /// Integer segments index into sequences. Defaults to the whole document.
    #[arg(long, short, default_value = "")]
    pub path: String,

    /// Additionally print the value re-encoded as YAML.
    #[arg(long)]
    pub normalize: bool,
}

/// Shorthand forms: a single scalar, or a list of scalars.
pub type Shorthand = BasicOrAdvanced<Scalar, Vec<Scalar>>;

/// Everything `inspect` understands. Shorthands take precedence over mappings.
pub type Inspected = BasicOrAdvanced<Shorthand, Structured>;

/// A string, number or boolean, kept exactly as it was written.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Scalar(Value);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(Self(value)),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a string, number or boolean",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'static> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Sequence(_) => Unexpected::Seq,
        Value::Mapping(_) => Unexpected::Map,
        Value::Tagged(_) => Unexpected::Other("tagged value"),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Unexpected::Other("scalar"),
    }
}

impl Emptiness for Scalar {
    fn is_zero(&self) -> bool {
        self.0.as_str().is_some_and(str::is_empty)
    }
}

impl JsonSchema for Scalar {
    fn schema_name() -> Cow<'static, str> {
        "Scalar".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": ["string", "number", "boolean"]
        })
    }
}

/// A mapping with arbitrary keys and values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Structured(serde_yaml::Mapping);

impl Emptiness for Structured {
    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl JsonSchema for Structured {
    fn schema_name() -> Cow<'static, str> {
        "Structured".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "object"
        })
    }
}

/// The form a value was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Form {
    Scalar,
    Sequence,
    Mapping,
    Empty,
}

impl Form {
    pub fn of(value: &Inspected) -> Self {
        match value {
            BasicOrAdvanced::Basic(BasicOrAdvanced::Basic(_)) => Self::Scalar,
            BasicOrAdvanced::Basic(BasicOrAdvanced::Advanced(_)) => Self::Sequence,
            BasicOrAdvanced::Advanced(_) => Self::Mapping,
            BasicOrAdvanced::Basic(BasicOrAdvanced::Empty) | BasicOrAdvanced::Empty => Self::Empty,
        }
    }
}

/// Reads the document referenced by `arguments` and inspects the requested value.
pub fn run(arguments: &InspectArguments) -> Result<String> {
    debug!(file = %arguments.file.display(), "reading document");
    let input = std::fs::read_to_string(&arguments.file).context(ReadDocumentSnafu)?;
    inspect(&input, &arguments.path, arguments.normalize)
}

/// Inspects the value at the dotted key `path` of the document `input`.
///
/// Returns the [`Form`] of the value on the first line, followed by the re-encoded value if
/// `normalize` is set.
pub fn inspect(input: &str, path: &str, normalize: bool) -> Result<String> {
    let document = yaml::parse_node(input).context(ParseDocumentSnafu)?;
    let node = yaml::lookup(&document, path).context(ResolvePathSnafu)?;
    let value = Inspected::from_node(node).context(DecodeValueSnafu { path })?;

    let form = Form::of(&value);
    info!(%form, path, "inspected value");

    let mut output = format!("{form}\n");
    if normalize {
        let encoded = value.encode().context(EncodeValueSnafu)?;
        let normalized = yaml::to_string(
            &encoded,
            SerializeOptions {
                explicit_document: false,
                singleton_map: false,
            },
        )
        .context(SerializeValueSnafu)?;
        output.push_str(&normalized);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    const COMPOSE: &str = indoc! {"
        services:
          web:
            image: nginx:1.27
            ports: [80, 443]
          worker:
            image:
              name: worker
              tag: v2
            command: run
          sidecar:
            image: ~
    "};

    #[rstest]
    #[case("services.web.image", "scalar")]
    #[case("services.web.ports", "sequence")]
    #[case("services.web.ports.0", "scalar")]
    #[case("services.worker.image", "mapping")]
    #[case("services.sidecar.image", "empty")]
    #[case("services", "mapping")]
    fn forms(#[case] path: &str, #[case] expected: &str) {
        let output = inspect(COMPOSE, path, false).expect("value must be inspectable");
        assert_eq!(output, format!("{expected}\n"));
    }

    #[rstest]
    #[case("true")]
    #[case("42")]
    #[case("'1.27'")]
    fn scalars(#[case] input: &str) {
        let output = inspect(input, "", false).expect("value must be inspectable");
        assert_eq!(output, "scalar\n");
    }

    #[rstest]
    // An empty string is a zero scalar, and a string is never a sequence
    #[case("''")]
    // An empty sequence is a zero sequence, and a sequence is never a mapping
    #[case("[]")]
    #[case("[[nested]]")]
    fn undecodable(#[case] input: &str) {
        let err = inspect(input, "", false).unwrap_err();
        assert!(matches!(err, Error::DecodeValue { .. }), "{err}");
    }

    #[test]
    fn missing_path() {
        let err = inspect(COMPOSE, "services.db.image", false).unwrap_err();
        assert!(matches!(err, Error::ResolvePath { .. }));
    }

    #[test]
    fn normalize() {
        let output = inspect(
            "image: { name: worker, tag: v2 }",
            "image",
            true,
        )
        .expect("value must be inspectable");
        assert_eq!(
            output,
            indoc! {"
                mapping
                name: worker
                tag: v2
            "}
        );

        let output = inspect("ports: [80, '443']", "ports", true).expect("value must be inspectable");
        assert_eq!(output, "sequence\n- 80\n- '443'\n");
    }

    #[test]
    fn run_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temporary file must be created");
        file.write_all(COMPOSE.as_bytes())
            .expect("temporary file must be writable");

        let output = run(&InspectArguments {
            file: file.path().to_owned(),
            path: "services.web.image".to_owned(),
            normalize: true,
        })
        .expect("value must be inspectable");
        assert_eq!(output, "scalar\nnginx:1.27\n");
    }

    #[test]
    fn run_missing_file() {
        let err = run(&InspectArguments {
            file: PathBuf::from("/does/not/exist.yaml"),
            path: String::new(),
            normalize: false,
        })
        .unwrap_err();
        assert!(matches!(err, Error::ReadDocument { .. }));
    }

    #[test]
    fn schema_prefers_shorthands() {
        let schema = schemars::schema_for!(Inspected);
        let any_of = schema
            .get("anyOf")
            .and_then(serde_json::Value::as_array)
            .expect("schema must contain anyOf");
        assert_eq!(any_of.len(), 2);
        assert!(any_of[0].get("anyOf").is_some());
        assert_eq!(any_of[1], serde_json::json!({ "$ref": "#/$defs/Structured" }));
    }
}
