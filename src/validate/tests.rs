//! Tests for configuration validation.

use super::{ValidationErrorKind, validate, validate_or_fail};
use crate::config::parse;
use crate::error::DevhostError;
use crate::test_support::{FakeProbe, MULTI_CONFIG, SHOP_CONFIG};
use std::path::Path;

const ROOT: &str = "/srv/stack";

fn kinds(text: &str, probe: &FakeProbe) -> Vec<ValidationErrorKind> {
    let model = parse(text).unwrap();
    validate(&model, probe, Path::new(ROOT))
        .into_iter()
        .map(|e| e.kind)
        .collect()
}

#[test]
fn test_valid_config_has_no_errors() {
    let model = parse(SHOP_CONFIG).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn test_missing_default_runtime_reported_once() {
    let text = "\
php:
  default: 7.4
  versions:
    8.2:
      fpm_listen: 127.0.0.1:9082
hosts:
  shop:
    folder: shop
";
    let model = parse(text).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::UnknownDefaultRuntime);
    assert_eq!(errors[0].entity, "7.4");
    assert!(errors[0].message.contains("'7.4'"));
}

#[test]
fn test_missing_default_fails_before_rendering() {
    let text = "php:\n  default: 7.4\n  versions:\n";
    let model = parse(text).unwrap();
    let err = validate_or_fail(&model, &FakeProbe::new(), Path::new(ROOT)).unwrap_err();
    match err {
        DevhostError::Validation(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_host_errors_follow_declaration_order() {
    let text = "\
php:
  versions:
    8.2:
      fpm_bin: /usr/sbin/php-fpm
hosts:
  zeta:
    php: 9.9
    folder: z
  alpha:
    php: 8.2
server:
  mpm: threaded
";
    let model = parse(text).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));

    let summary: Vec<(ValidationErrorKind, &str)> =
        errors.iter().map(|e| (e.kind, e.entity.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (ValidationErrorKind::UnknownRuntime, "zeta"),
            (ValidationErrorKind::MissingListenAddress, "alpha"),
            (ValidationErrorKind::MissingDocumentRoot, "alpha"),
            (ValidationErrorKind::UnknownConcurrencyModel, "threaded"),
        ]
    );
}

#[test]
fn test_host_without_runtime_or_default() {
    let text = "php:\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  shop:\n    folder: shop\n";
    assert_eq!(
        kinds(text, &FakeProbe::new()),
        vec![ValidationErrorKind::NoRuntime]
    );
}

#[test]
fn test_mpm_module_must_exist() {
    let probe = FakeProbe::new();
    assert_eq!(
        kinds(MULTI_CONFIG, &probe),
        vec![ValidationErrorKind::MissingModule]
    );

    let probe =
        FakeProbe::new().with_path("/usr/local/apache2/lib/apache2/modules/mod_mpm_event.so");
    assert!(kinds(MULTI_CONFIG, &probe).is_empty());
}

#[test]
fn test_builtin_mpm_needs_no_module() {
    let text = "server:\n  mpm: builtin\nphp:\n  default: 8.2\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  shop:\n    folder: shop\n";
    assert!(kinds(text, &FakeProbe::new()).is_empty());
}

#[test]
fn test_invalid_host_name() {
    let text = "php:\n  default: 8.2\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  my_shop:\n    folder: shop\n";
    assert_eq!(
        kinds(text, &FakeProbe::new()),
        vec![ValidationErrorKind::InvalidHostName]
    );
}

#[test]
fn test_scalar_host_entry_is_invalid() {
    let text = "php:\n  default: 8.2\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  shop: sites/shop\n";
    assert_eq!(
        kinds(text, &FakeProbe::new()),
        vec![ValidationErrorKind::InvalidEntry]
    );
}

#[test]
fn test_port_checks() {
    let text = "server:\n  http_port: 70000\n  https_port: web\n";
    assert_eq!(
        kinds(text, &FakeProbe::new()),
        vec![ValidationErrorKind::InvalidPort, ValidationErrorKind::InvalidPort]
    );

    let text = "server:\n  http_port: 8080\n  https_port: 8080\n";
    let model = parse(text).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("both use port 8080"));
}

#[test]
fn test_runtime_listen_conflict() {
    let text = "php:\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9000\n    8.3:\n      fpm_listen: 127.0.0.1:9000\n";
    let model = parse(text).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::ListenConflict);
    assert_eq!(errors[0].entity, "8.3");
    assert!(errors[0].message.contains("'8.2'"));
}

#[test]
fn test_errors_name_entity_and_fix() {
    let text = "php:\n  default: 8.2\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  shop:\n    php: 8.1\n    folder: shop\n";
    let model = parse(text).unwrap();
    let errors = validate(&model, &FakeProbe::new(), Path::new(ROOT));

    assert_eq!(errors.len(), 1);
    let rendered = errors[0].to_string();
    assert!(rendered.contains("'shop'"));
    assert!(rendered.contains("'8.1'"));
    assert!(rendered.contains("fix: add php.versions.8.1"));
}
