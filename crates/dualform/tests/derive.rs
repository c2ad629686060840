use dualform::{
    BasicOrAdvanced, Emptiness, Validate, ValidationError, Validator, validation::validate,
};
use indoc::indoc;
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Emptiness, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(with = "check_digest")]
struct ImageRef {
    #[serde(default)]
    tag: String,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    #[emptiness(skip)]
    pull_policy: PullPolicy,
}

fn check_digest(image: &ImageRef, validator: Validator) -> Result<(), ValidationError> {
    match &image.digest {
        Some(digest) if !digest.starts_with("sha256:") => Err(validator
            .field(&"digest")
            .error_invalid("only sha256 digests are supported")),
        _ => Ok(()),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Validate)]
enum PullPolicy {
    #[default]
    IfNotPresent,
    Always,
}

impl Emptiness for PullPolicy {}

#[derive(Debug, Deserialize, Emptiness, Validate)]
struct Port(u16, #[emptiness(skip)] Protocol);

#[derive(Debug, Default, Deserialize, Validate)]
enum Protocol {
    #[default]
    Tcp,
    Udp,
}

#[derive(Debug, Deserialize, Emptiness, Validate)]
struct Service {
    image: BasicOrAdvanced<String, ImageRef>,
    #[serde(default)]
    ports: Vec<BasicOrAdvanced<u16, PortSpec>>,
}

#[derive(Debug, Deserialize, Emptiness, Validate)]
#[validate(with = "check_port_spec")]
struct PortSpec {
    container_port: u16,
    #[serde(default)]
    host_port: Option<u16>,
}

fn check_port_spec(spec: &PortSpec, validator: Validator) -> Result<(), ValidationError> {
    if spec.container_port == 0 {
        return Err(validator
            .field(&"container_port")
            .error_invalid("port 0 is reserved"));
    }
    Ok(())
}

#[derive(Validate)]
enum Source {
    Inline { content: BasicOrAdvanced<String, ImageRef> },
    Reference(#[validate(skip)] String, ImageRef),
    Unset,
}

#[derive(Default, Emptiness, Validate)]
#[emptiness(bound = "T: Emptiness")]
#[validate(bound = "T: Validate")]
struct Wrapper<T> {
    inner: T,
}

#[test]
fn derived_emptiness_requires_all_fields_zero() {
    assert!(ImageRef::default().is_zero());
    assert!(
        ImageRef {
            pull_policy: PullPolicy::Always,
            ..Default::default()
        }
        .is_zero(),
        "skipped fields must not count"
    );
    assert!(
        !ImageRef {
            digest: Some("sha256:abc".to_owned()),
            ..Default::default()
        }
        .is_zero()
    );

    // u16 has no notion of emptiness, so a port is never zero
    assert!(!Port(0, Protocol::Udp).is_zero());

    assert!(Wrapper::<String>::default().is_zero());
    assert!(!Wrapper { inner: 1u8 }.is_zero());
}

#[test]
fn derived_emptiness_drives_fallback() {
    // `{ pullPolicy: Always }` decodes into an `ImageRef` that is zero, so the pair falls back to
    // the advanced shape.
    let pair = BasicOrAdvanced::<ImageRef, serde_yaml::Value>::from_node(
        &serde_yaml::from_str("{ pullPolicy: Always }").expect("valid YAML"),
    )
    .expect("node must decode");
    assert!(pair.is_advanced());
}

#[test]
fn decode_and_validate_document() {
    let service: Service = serde_yaml::from_str(indoc! {"
        image:
          tag: '1.27'
          digest: sha256:abc
        ports:
          - 8080
          - container_port: 9090
            host_port: 19090
    "})
    .expect("document must deserialize");

    assert!(service.image.is_advanced());
    assert!(service.ports[0].is_basic());
    assert!(service.ports[1].is_advanced());
    assert!(!service.is_zero());
    validate(&service).expect("service must be valid");
}

#[test]
fn validation_errors_carry_field_paths() {
    let service: Service = serde_yaml::from_str(indoc! {"
        image: { tag: v1, digest: 'md5:abc' }
    "})
    .expect("document must deserialize");
    let err = validate(&service).unwrap_err();
    assert_eq!(err.path(), "image.digest");

    let service: Service = serde_yaml::from_str(indoc! {"
        image: nginx
        ports:
          - 80
          - container_port: 0
    "})
    .expect("document must deserialize");
    let err = validate(&service).unwrap_err();
    assert_eq!(err.path(), "ports.1.container_port");
    assert_eq!(
        err.to_string(),
        "failed to validate ports.1.container_port"
    );
}

#[test]
fn pair_validate_passes_nested_error_through() {
    let image = BasicOrAdvanced::<String, ImageRef>::from_advanced(ImageRef {
        digest: Some("md5:abc".to_owned()),
        ..Default::default()
    });
    let err = image.validate().unwrap_err();
    assert_eq!(err.path(), "digest");
}

#[test]
fn derived_enum_validation() {
    let invalid = ImageRef {
        digest: Some("md5:abc".to_owned()),
        ..Default::default()
    };

    validate(&Source::Unset).expect("unit variants are valid");
    validate(&Source::Inline {
        content: BasicOrAdvanced::from_basic("nginx".to_owned()),
    })
    .expect("basic shape is valid");

    let err = validate(&Source::Inline {
        content: BasicOrAdvanced::from_advanced(invalid.clone()),
    })
    .unwrap_err();
    assert_eq!(err.path(), "content.digest");

    let err = validate(&Source::Reference("ignored".to_owned(), invalid)).unwrap_err();
    assert_eq!(err.path(), "1.digest");
}
