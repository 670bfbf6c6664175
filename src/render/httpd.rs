//! httpd.conf rendering.

use super::RenderContext;
use crate::config::types::BASE_MODULES;
use crate::config::{HostSpec, ServerSpec, StackSpec};
use std::path::Path;

/// `combined` access log format.
const LOG_FORMAT: &str =
    r#"LogFormat "%h %l %u %t \"%r\" %>s %b \"%{Referer}i\" \"%{User-Agent}i\"" combined"#;

/// The two listeners every host gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Plain,
    Tls,
}

impl Transport {
    fn port(self, server: &ServerSpec) -> u16 {
        match self {
            Transport::Plain => server.http_port,
            Transport::Tls => server.https_port,
        }
    }

    fn log_stem(self, host: &str) -> String {
        match self {
            Transport::Plain => host.to_string(),
            Transport::Tls => format!("{}-ssl", host),
        }
    }
}

/// Render the complete httpd.conf.
///
/// Directive order: root and pid, listeners, identity, server name, logging,
/// mime types, module loads, default document root, then host blocks.
pub fn render_main<'a>(
    stack: &StackSpec,
    host_blocks: impl IntoIterator<Item = &'a str>,
    ctx: &RenderContext,
) -> String {
    let server = &stack.server;
    let log_dir = server.log_dir(&ctx.root);
    let html_root = ctx.root.join("html");

    let mut lines = vec![
        format!("ServerRoot {}", quoted(&server.server_root)),
        format!("PidFile {}", quoted(&server.pid_file(&ctx.root))),
        format!("Listen {}:{}", server.bind_ip, server.http_port),
        format!("Listen {}:{}", server.bind_ip, server.https_port),
        format!("User {}", ctx.identity.user),
        format!("Group {}", ctx.identity.group),
        format!("ServerName {}:{}", server.fqdn(&server.server_name), server.http_port),
        format!("LogLevel {}", server.log_level),
        LOG_FORMAT.to_string(),
        format!("ErrorLog {}", quoted(&log_dir.join("error.log"))),
        format!("CustomLog {} combined", quoted(&log_dir.join("access.log"))),
        format!("TypesConfig {}", quoted(&server.types_config)),
    ];

    let extra_module = server.mpm.module();
    for (module, file) in BASE_MODULES.iter().copied().chain(extra_module) {
        lines.push(format!(
            "LoadModule {} {}",
            module,
            server.modules_dir.join(file).display()
        ));
    }

    lines.push(String::new());
    lines.push(format!("DocumentRoot {}", quoted(&html_root)));
    lines.extend(directory_block(&html_root, ""));

    let mut out = lines.join("\n");
    out.push('\n');
    for block in host_blocks {
        out.push('\n');
        out.push_str(block);
    }
    out
}

/// Render the plaintext and encrypted virtual hosts for one host.
pub fn render_host(stack: &StackSpec, host: &HostSpec, ctx: &RenderContext) -> String {
    let backend = stack
        .runtime_for(host)
        .map(|runtime| runtime.effective_listen())
        .unwrap_or_default();

    let plain = transport_block(&stack.server, host, &backend, Transport::Plain, ctx);
    let tls = transport_block(&stack.server, host, &backend, Transport::Tls, ctx);
    format!("{}\n{}", plain, tls)
}

fn transport_block(
    server: &ServerSpec,
    host: &HostSpec,
    backend: &str,
    transport: Transport,
    ctx: &RenderContext,
) -> String {
    let document_root = host.document_root(&ctx.root);
    let log_dir = server.log_dir(&ctx.root);
    let log_stem = transport.log_stem(&host.name);
    let indent = "    ";

    let mut lines = vec![
        format!("<VirtualHost {}:{}>", server.bind_ip, transport.port(server)),
        format!("{}ServerName {}", indent, server.fqdn(&host.name)),
        format!("{}ServerAdmin {}", indent, server.server_admin),
        format!("{}DocumentRoot {}", indent, quoted(&document_root)),
        format!(
            "{}ErrorLog {}",
            indent,
            quoted(&log_dir.join(format!("{}.error.log", log_stem)))
        ),
        format!(
            "{}CustomLog {} combined",
            indent,
            quoted(&log_dir.join(format!("{}.access.log", log_stem)))
        ),
        format!("{}DirectoryIndex index.php index.html", indent),
    ];
    lines.extend(directory_block(&document_root, indent));
    lines.push(format!(r#"{}<FilesMatch "\.php$">"#, indent));
    lines.push(format!(r#"{}    SetHandler "proxy:fcgi://{}""#, indent, backend));
    lines.push(format!("{}</FilesMatch>", indent));

    if transport == Transport::Tls {
        let ssl_dir = server.ssl_dir(&ctx.root);
        lines.push(format!("{}SSLEngine on", indent));
        lines.push(format!(
            "{}SSLCertificateFile {}",
            indent,
            quoted(&ssl_dir.join(format!("{}.crt", host.name)))
        ));
        lines.push(format!(
            "{}SSLCertificateKeyFile {}",
            indent,
            quoted(&ssl_dir.join(format!("{}.key", host.name)))
        ));
    }

    lines.push("</VirtualHost>".to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn directory_block(path: &Path, indent: &str) -> Vec<String> {
    vec![
        format!("{}<Directory {}>", indent, quoted(path)),
        format!("{}    AllowOverride All", indent),
        format!("{}    Require all granted", indent),
        format!("{}</Directory>", indent),
    ]
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}
