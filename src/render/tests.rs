//! Tests for artifact rendering.

use super::*;
use crate::config::parse;
use crate::test_support::{MULTI_CONFIG, SHOP_CONFIG, test_identity};

fn ctx() -> RenderContext {
    RenderContext {
        root: PathBuf::from("/srv/stack"),
        identity: test_identity(),
    }
}

fn render_text(text: &str) -> RenderedArtifacts {
    render(&parse(text).unwrap(), &ctx())
}

#[test]
fn test_rendering_is_deterministic() {
    let first = render_text(MULTI_CONFIG);
    let second = render_text(MULTI_CONFIG);
    assert_eq!(first, second);
}

#[test]
fn test_shop_routes_both_listeners_to_its_runtime() {
    let artifacts = render_text(SHOP_CONFIG);
    let shop = &artifacts.per_host["shop"];

    assert_eq!(shop.matches("<VirtualHost 127.0.0.1:8080>").count(), 1);
    assert_eq!(shop.matches("<VirtualHost 127.0.0.1:8443>").count(), 1);
    assert_eq!(
        shop.matches(r#"SetHandler "proxy:fcgi://127.0.0.1:9082""#).count(),
        2
    );
    assert_eq!(shop.matches("ServerName shop.test").count(), 2);
    assert!(shop.contains(r#"DocumentRoot "/srv/stack/sites/shop""#));
    assert!(shop.contains(r#"SSLCertificateFile "/srv/stack/ssl/shop.crt""#));
    assert!(shop.contains(r#"SSLCertificateKeyFile "/srv/stack/ssl/shop.key""#));
    assert!(shop.contains("/srv/stack/logs/shop-ssl.error.log"));
}

#[test]
fn test_main_document_contains_host_blocks_in_order() {
    let artifacts = render_text(MULTI_CONFIG);
    let main = &artifacts.main_document;

    let blog = main.find("ServerName blog.local").unwrap();
    let api = main.find("ServerName api.local").unwrap();
    assert!(blog < api);
    assert!(main.ends_with(&artifacts.per_host["api"]));
    assert_eq!(
        artifacts.per_host.keys().collect::<Vec<_>>(),
        vec!["blog", "api"]
    );
}

#[test]
fn test_main_document_header() {
    let main = render_text(SHOP_CONFIG).main_document;
    let lines: Vec<&str> = main.lines().collect();

    assert_eq!(lines[0], r#"ServerRoot "/opt/local""#);
    assert_eq!(lines[1], r#"PidFile "/srv/stack/tmp/httpd.pid""#);
    assert_eq!(lines[2], "Listen 127.0.0.1:8080");
    assert_eq!(lines[3], "Listen 127.0.0.1:8443");
    assert_eq!(lines[4], "User dev");
    assert_eq!(lines[5], "Group staff");
    assert_eq!(lines[6], "ServerName localdev.test:8080");
    assert!(main.contains(r#"DocumentRoot "/srv/stack/html""#));
}

#[test]
fn test_concurrency_module_loaded_after_base_modules() {
    let main = render_text(MULTI_CONFIG).main_document;
    let loads: Vec<&str> = main
        .lines()
        .filter(|l| l.starts_with("LoadModule "))
        .collect();

    assert_eq!(loads.len(), BASE_MODULE_COUNT + 1);
    assert_eq!(
        *loads.last().unwrap(),
        "LoadModule mpm_event_module /usr/local/apache2/lib/apache2/modules/mod_mpm_event.so"
    );
}

#[test]
fn test_builtin_model_loads_only_base_modules() {
    let main = render_text(SHOP_CONFIG).main_document;
    assert!(!main.contains("mpm_"));
    assert_eq!(
        main.lines().filter(|l| l.starts_with("LoadModule ")).count(),
        BASE_MODULE_COUNT
    );
}

#[test]
fn test_pinned_host_uses_its_own_runtime() {
    let artifacts = render_text(MULTI_CONFIG);
    assert!(artifacts.per_host["blog"].contains("proxy:fcgi://127.0.0.1:9074"));
    assert!(artifacts.per_host["blog"].contains(r#"DocumentRoot "/var/www/blog""#));
    assert!(artifacts.per_host["api"].contains("proxy:fcgi://127.0.0.1:9083"));
}

#[test]
fn test_pool_document_unprivileged() {
    let artifacts = render_text(SHOP_CONFIG);
    let pool = &artifacts.per_runtime["8.2"];

    assert!(pool.starts_with("[global]\npid = /srv/stack/tmp/php-fpm-8.2.pid\n"));
    assert!(pool.contains("error_log = /srv/stack/logs/php-fpm-8.2.log"));
    assert!(pool.contains("listen = 127.0.0.1:9082"));
    assert!(pool.contains("listen.owner = dev\nlisten.group = staff\nlisten.mode = 0600"));
    assert!(!pool.contains("\nuser = "));
    assert!(pool.ends_with("clear_env = no\n"));
}

#[test]
fn test_pool_document_privileged_names_worker_identity() {
    let model = parse(SHOP_CONFIG).unwrap();
    let mut ctx = ctx();
    ctx.identity.privileged = true;
    let pool = &render(&model, &ctx).per_runtime["8.2"];

    assert!(pool.contains("\nuser = dev\ngroup = staff\n"));
}

#[test]
fn test_pool_listen_defaults_from_version() {
    let text = "php:\n  versions:\n    8.1:\n      fpm_bin: /usr/sbin/php-fpm\n";
    let artifacts = render_text(text);
    assert!(artifacts.per_runtime["8.1"].contains("listen = 127.0.0.1:9081"));
}

#[test]
fn test_pool_paths() {
    let model = parse(SHOP_CONFIG).unwrap();
    let server = crate::config::ServerSpec::from_model(&model);
    let paths = PoolPaths::new(std::path::Path::new("/srv/stack"), &server, "8.2");

    assert_eq!(
        paths.config,
        PathBuf::from("/srv/stack/tmp/phpfpm/php-fpm-8.2.conf")
    );
    assert_eq!(paths.pid_file, PathBuf::from("/srv/stack/tmp/php-fpm-8.2.pid"));
}

const BASE_MODULE_COUNT: usize = crate::config::types::BASE_MODULES.len();
