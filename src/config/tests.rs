//! Tests for config parsing and typed views.

use crate::config::types::default_fpm_listen;
use crate::config::{
    ConcurrencyModel, ConfigMap, ConfigModel, ConfigNode, Scalar, ServerSpec, StackSpec, parse,
};
use crate::error::DevhostError;
use std::path::{Path, PathBuf};

fn keys(map: &ConfigMap) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

// =========================================================================
// Parser
// =========================================================================

#[test]
fn test_parse_nested_scopes() {
    let text = r#"
server:
  http_port: 8080
  use_mkcert: TRUE
php:
  default: 8.2
  versions:
    8.2:
      fpm_listen: 127.0.0.1:9082
hosts:
  shop:
    folder: sites/shop
"#;
    let model = parse(text).unwrap();

    assert_eq!(keys(model.root()), vec!["server", "php", "hosts"]);
    assert_eq!(
        model.get(&["server", "http_port"]),
        Some(&ConfigNode::Scalar(Scalar::Int(8080)))
    );
    assert_eq!(
        model.get(&["server", "use_mkcert"]),
        Some(&ConfigNode::Scalar(Scalar::Bool(true)))
    );
    assert_eq!(model.text(&["php", "default"]).as_deref(), Some("8.2"));
    assert_eq!(
        model.text(&["php", "versions", "8.2", "fpm_listen"]).as_deref(),
        Some("127.0.0.1:9082")
    );
    assert_eq!(
        model.text(&["hosts", "shop", "folder"]).as_deref(),
        Some("sites/shop")
    );
}

#[test]
fn test_scalar_coercion() {
    assert_eq!(Scalar::coerce("  "), Scalar::Str(String::new()));
    assert_eq!(Scalar::coerce("False"), Scalar::Bool(false));
    assert_eq!(Scalar::coerce("true"), Scalar::Bool(true));
    assert_eq!(Scalar::coerce("0042"), Scalar::Int(42));
    assert_eq!(Scalar::coerce("-1"), Scalar::Str("-1".to_string()));
    assert_eq!(Scalar::coerce("8.2"), Scalar::Str("8.2".to_string()));
    assert_eq!(
        Scalar::coerce("99999999999999999999999"),
        Scalar::Str("99999999999999999999999".to_string())
    );
}

#[test]
fn test_value_splits_on_first_colon_only() {
    let model = parse("listen: 127.0.0.1:9000\n").unwrap();
    assert_eq!(model.text(&["listen"]).as_deref(), Some("127.0.0.1:9000"));
}

#[test]
fn test_comments_and_blank_lines_are_ignored() {
    let text = "# top comment\n\nserver:\n      # deeply indented comment\n  bind_ip: 0.0.0.0\n\n  # another\n  log_level: debug\n";
    let model = parse(text).unwrap();
    assert_eq!(keys(model.map(&["server"]).unwrap()), vec!["bind_ip", "log_level"]);
}

#[test]
fn test_inline_hash_is_part_of_value() {
    let model = parse("admin: ops # on call\n").unwrap();
    assert_eq!(model.text(&["admin"]).as_deref(), Some("ops # on call"));
}

#[test]
fn test_missing_separator_is_syntax_error() {
    let err = parse("server:\n  bind_ip 127.0.0.1\n").unwrap_err();
    match err {
        DevhostError::Syntax { line, message } => {
            assert_eq!(line, 2);
            assert!(message.contains("bind_ip 127.0.0.1"));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_dedent_to_unknown_column_is_syntax_error() {
    let text = "a:\n    b:\n        c: 1\n      d: 2\n";
    let err = parse(text).unwrap_err();
    assert!(matches!(err, DevhostError::Syntax { line: 4, .. }));
}

#[test]
fn test_deeper_line_after_scalar_joins_its_scope() {
    let model = parse("a: 1\n  b: 2\n").unwrap();
    assert_eq!(keys(model.root()), vec!["a", "b"]);
    assert_eq!(model.get(&["b"]), Some(&ConfigNode::Scalar(Scalar::Int(2))));

    let model = parse("a:\n  b: 1\n    c: 2\n").unwrap();
    assert_eq!(keys(model.root()), vec!["a"]);
    assert_eq!(model.get(&["a", "c"]), Some(&ConfigNode::Scalar(Scalar::Int(2))));
}

#[test]
fn test_return_to_sibling_column_after_deeper_line() {
    let model = parse("a:\n  b: 1\n    c: 2\n  d: 3\ne: 4\n").unwrap();
    assert_eq!(keys(model.root()), vec!["a", "e"]);
    assert_eq!(keys(model.map(&["a"]).unwrap()), vec!["b", "c", "d"]);
}

#[test]
fn test_dedent_closes_multiple_scopes() {
    let text = "a:\n  b:\n    c: 1\nd: 2\n";
    let model = parse(text).unwrap();
    assert_eq!(keys(model.root()), vec!["a", "d"]);
    assert_eq!(model.get(&["a", "b", "c"]), Some(&ConfigNode::Scalar(Scalar::Int(1))));
}

#[test]
fn test_empty_scope_is_empty_map() {
    let model = parse("hosts:\nserver:\n  mpm: event\n").unwrap();
    assert_eq!(model.map(&["hosts"]).map(|m| m.len()), Some(0));
}

#[test]
fn test_duplicate_key_replaces_in_place() {
    let model = parse("a: 1\nb: 2\na: 3\n").unwrap();
    assert_eq!(keys(model.root()), vec!["a", "b"]);
    assert_eq!(model.get(&["a"]), Some(&ConfigNode::Scalar(Scalar::Int(3))));
}

#[test]
fn test_tabs_count_as_single_columns() {
    let model = parse("a:\n\tb: x\n\tc: y\n").unwrap();
    assert_eq!(keys(model.map(&["a"]).unwrap()), vec!["b", "c"]);
}

#[test]
fn test_round_trip_preserves_keys_order_and_kinds() {
    let mut versions = ConfigMap::new();
    let mut v82 = ConfigMap::new();
    v82.insert(
        "fpm_listen".to_string(),
        ConfigNode::Scalar(Scalar::Str("127.0.0.1:9082".to_string())),
    );
    versions.insert("8.2".to_string(), ConfigNode::Map(v82));
    versions.insert("7.4".to_string(), ConfigNode::Map(ConfigMap::new()));

    let mut server = ConfigMap::new();
    server.insert("https_port".to_string(), ConfigNode::Scalar(Scalar::Int(8443)));
    server.insert("use_mkcert".to_string(), ConfigNode::Scalar(Scalar::Bool(false)));
    server.insert("mpm".to_string(), ConfigNode::Scalar(Scalar::Str("event".to_string())));

    let mut root = ConfigMap::new();
    root.insert("server".to_string(), ConfigNode::Map(server));
    root.insert("versions".to_string(), ConfigNode::Map(versions));
    root.insert("zeta".to_string(), ConfigNode::Scalar(Scalar::Int(1)));
    let model = ConfigModel::new(root);

    let reparsed = parse(&model.to_source()).unwrap();

    assert_eq!(reparsed, model);
    assert_eq!(keys(reparsed.root()), vec!["server", "versions", "zeta"]);
    assert_eq!(keys(reparsed.map(&["versions"]).unwrap()), vec!["8.2", "7.4"]);
    assert_eq!(
        keys(reparsed.map(&["server"]).unwrap()),
        vec!["https_port", "use_mkcert", "mpm"]
    );
}

#[test]
fn test_load_missing_file_names_path() {
    let err = ConfigModel::load("/nonexistent/devhost/config.yml").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("/nonexistent/devhost/config.yml"));
    assert!(msg.contains("--config"));
}

// =========================================================================
// Typed views
// =========================================================================

#[test]
fn test_server_defaults() {
    let server = ServerSpec::from_model(&ConfigModel::default());

    assert_eq!(server.apache_prefix, PathBuf::from("/opt/local"));
    assert_eq!(server.server_root, PathBuf::from("/opt/local"));
    assert_eq!(server.modules_dir, PathBuf::from("/opt/local/lib/apache2/modules"));
    assert_eq!(server.types_config, PathBuf::from("/opt/local/etc/apache2/mime.types"));
    assert_eq!(server.bind_ip, "127.0.0.1");
    assert_eq!(server.http_port, 8080);
    assert_eq!(server.https_port, 8443);
    assert_eq!(server.server_admin, "webmaster@localdev.test");
    assert_eq!(server.mpm, ConcurrencyModel::Builtin);
    assert!(!server.use_mkcert);
    assert_eq!(server.httpd_binary(), PathBuf::from("/opt/local/sbin/httpd"));
    assert_eq!(
        server.pid_file(Path::new("/srv/stack")),
        PathBuf::from("/srv/stack/tmp/httpd.pid")
    );
}

#[test]
fn test_httpd_binary_resolution_order() {
    let model = parse("server:\n  sbin_dir: /usr/sbin\n").unwrap();
    assert_eq!(
        ServerSpec::from_model(&model).httpd_binary(),
        PathBuf::from("/usr/sbin/httpd")
    );

    let model = parse("server:\n  sbin_dir: /usr/sbin\n  httpd_bin: /custom/httpd\n").unwrap();
    assert_eq!(
        ServerSpec::from_model(&model).httpd_binary(),
        PathBuf::from("/custom/httpd")
    );
}

#[test]
fn test_runtime_defaults_derive_from_id() {
    assert_eq!(default_fpm_listen("8.2"), "127.0.0.1:9082");
    assert_eq!(default_fpm_listen("latest"), "127.0.0.1:9000");

    let model = parse("php:\n  versions:\n    8.3:\n      fpm_listen: \n").unwrap();
    let stack = StackSpec::from_model(&model);
    let runtime = &stack.runtimes["8.3"];
    assert_eq!(runtime.listen_address(), None);
    assert_eq!(runtime.effective_listen(), "127.0.0.1:9083");
    assert_eq!(runtime.fpm_binary(), PathBuf::from("/opt/local/sbin/php-fpm83"));
}

#[test]
fn test_host_resolves_default_runtime() {
    let text = "php:\n  default: 8.2\n  versions:\n    8.2:\n      fpm_listen: 127.0.0.1:9082\nhosts:\n  shop:\n    folder: shop\n  blog:\n    folder: /var/www/blog\n    php: 7.4\n";
    let stack = StackSpec::from_model(&parse(text).unwrap());

    assert_eq!(stack.hosts.len(), 2);
    assert_eq!(stack.hosts[0].resolved_runtime(Some("8.2")), Some("8.2"));
    assert_eq!(
        stack.runtime_for(&stack.hosts[0]).and_then(|r| r.listen_address()),
        Some("127.0.0.1:9082")
    );
    assert!(stack.runtime_for(&stack.hosts[1]).is_none());
    assert_eq!(
        stack.hosts[1].document_root(Path::new("/srv")),
        PathBuf::from("/var/www/blog")
    );
    assert_eq!(
        stack.hosts[0].document_root(Path::new("/srv")),
        PathBuf::from("/srv/shop")
    );
}

#[test]
fn test_concurrency_model_modules() {
    assert_eq!(ConcurrencyModel::Builtin.module(), None);
    assert_eq!(
        ConcurrencyModel::Event.module(),
        Some(("mpm_event_module", "mod_mpm_event.so"))
    );
    for model in ConcurrencyModel::ALL {
        assert_eq!(ConcurrencyModel::from_str(model.as_str()), Some(model));
    }
    assert_eq!(ConcurrencyModel::from_str("threaded"), None);
}
