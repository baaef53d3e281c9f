//! Rendering a realistic load balancer template.

use std::fs;
use std::sync::Arc;

use lb_reloader::render::RenderError;
use lb_reloader::{ServerNameTemplates, Template, TemplateFile};

mod common;

const HAPROXY_TEMPLATE: &str = r#"global
    daemon
{{#each Ports}}
frontend {{Label this}}
    bind {{IP}}:{{Port}}
    mode {{ToLower Mode}}
{{/each}}
{{#each Services}}
backend {{Label this}}
    mode {{Port.Mode}}
{{#each (ServerNames this ../Domain)}}
    # {{#if IsRegexp}}pattern {{Regexp}}{{else}}host {{Name}}{{/if}}
{{/each}}
{{#each ../Nodes}}
    server {{EscapeNode this}} {{this}}:{{../NodePort}} check
{{/each}}
{{/each}}
{{#each (IntRange 3 8000 10)}}
    listen stats-{{this}} {{Add this 1}}
{{/each}}
"#;

fn lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[test]
fn test_render_full_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(dir.path(), "haproxy.cfg.hbs", HAPROXY_TEMPLATE);
    let target = dir.path().join("haproxy.cfg");
    let names = Arc::new(ServerNameTemplates::parse("").unwrap());

    TemplateFile::new(&source, &target, names)
        .execute(&common::sample_cluster())
        .unwrap();

    let out = lines(&fs::read_to_string(&target).unwrap());
    let expected = [
        "global",
        "daemon",
        "frontend 0a000001_80_tcp_http",
        "bind 10.0.0.1:80",
        "mode http",
        "frontend 0a000001_5432_tcp_tcp",
        "bind 10.0.0.1:5432",
        "mode tcp",
        "backend web_prod_80_tcp_http",
        "mode http",
        "# host web.prod.svc.cluster.local",
        "# pattern ^www\\.example\\.org$",
        "# host example.org",
        "server node-a_cluster_internal node-a.cluster.internal:30080 check",
        "server node-b_cluster_internal node-b.cluster.internal:30080 check",
        "backend db_prod_5432_tcp_tcp",
        "mode tcp",
        "# host db.prod.svc.cluster.local",
        "server node-a_cluster_internal node-a.cluster.internal:30432 check",
        "server node-b_cluster_internal node-b.cluster.internal:30432 check",
        "listen stats-8000 8001",
        "listen stats-8010 8011",
        "listen stats-8020 8021",
    ];
    assert_eq!(out, expected);
}

#[test]
fn test_render_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(dir.path(), "haproxy.cfg.hbs", HAPROXY_TEMPLATE);
    let names = Arc::new(
        ServerNameTemplates::parse("{{Service.Name}}.{{Domain}},{{Service.Name}}.{{Service.Namespace}}")
            .unwrap(),
    );
    let template = TemplateFile::new(&source, dir.path().join("out"), names);

    let first = template.render(&common::sample_cluster()).unwrap();
    let second = template.render(&common::sample_cluster()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("# host web.cluster.local"));
    assert!(first.contains("# host web.prod"));
}

#[test]
fn test_template_edit_applies_on_next_render() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(dir.path(), "t.hbs", "v1 {{Domain}}");
    let target = dir.path().join("out");
    let template = TemplateFile::new(
        &source,
        &target,
        Arc::new(ServerNameTemplates::parse("").unwrap()),
    );

    template.execute(&common::sample_cluster()).unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "v1 cluster.local");

    fs::write(&source, "v2 {{Domain}}").unwrap();
    template.execute(&common::sample_cluster()).unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "v2 cluster.local");
}

#[test]
fn test_failing_helper_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_template(dir.path(), "t.hbs", "{{Add Domain 1}}");
    let target = dir.path().join("out");
    fs::write(&target, "last good").unwrap();

    let result = TemplateFile::new(
        &source,
        &target,
        Arc::new(ServerNameTemplates::parse("").unwrap()),
    )
    .execute(&common::sample_cluster());

    assert!(matches!(result, Err(RenderError::Render { .. })));
    assert_eq!(fs::read_to_string(&target).unwrap(), "last good");
}
