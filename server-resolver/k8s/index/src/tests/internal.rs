use super::*;
use crate::{InternalResolver, NativeResolver};
use std::sync::Arc;

#[test]
fn internal_servers_resolve_to_service() {
    let _tracing = init_tracing();
    let resolver = InternalResolver::new(vec![mk_service(
        "ws-machine",
        "machine",
        vec![
            ("8080/tcp", mk_server(8080, "http", "")),
            ("api", mk_server(9090, "http", "api/v1")),
        ],
    )]);

    let servers = resolver.resolve_internal_servers("machine");
    assert_eq!(servers.len(), 2);

    let web = &servers["8080/tcp"];
    assert_eq!(web.host(), "ws-machine");
    assert_eq!(web.protocol(), "http");
    assert_eq!(web.path(), "", "internal paths must not be rewritten");
    assert_eq!(web.port(), Some(8080));
    assert_eq!(web.target_port(), 8080);
    assert_eq!(web.endpoint_origin(), None);

    let api = &servers["api"];
    assert_eq!(api.path(), "api/v1");
    assert_eq!(api.target_port(), 9090);
    assert_eq!(api.url(), "http://ws-machine:9090/api/v1");
}

#[test]
fn machine_with_only_internal_servers() {
    let _tracing = init_tracing();
    let resolver = NativeResolver::new(
        vec![mk_service(
            "ws-db",
            "db",
            Some(("5432/tcp", mk_server(5432, "tcp", ""))),
        )],
        vec![],
        Arc::default(),
    );

    let servers = resolver.resolve("db");
    assert_eq!(servers, resolver.resolve_internal_servers("db"));
    assert_eq!(servers["5432/tcp"].host(), "ws-db");
}

#[test]
fn unknown_machine_has_no_servers() {
    let _tracing = init_tracing();
    let resolver = InternalResolver::new(vec![mk_service(
        "ws-machine",
        "machine",
        Some(("8080/tcp", mk_server(8080, "http", ""))),
    )]);
    assert!(resolver.resolve_internal_servers("other").is_empty());
}

#[test]
fn services_without_machine_are_not_indexed() {
    let _tracing = init_tracing();
    let unowned = k8s::Service {
        metadata: mk_meta(
            "unowned",
            mk_annotations(None, Some(("8080/tcp", mk_server(8080, "http", "")))),
        ),
        ..Default::default()
    };
    let resolver = InternalResolver::new(vec![unowned]);
    assert!(resolver.machine_names().next().is_none());
}

#[test]
fn invalid_annotations_are_ignored() {
    let _tracing = init_tracing();
    let mut invalid = mk_service(
        "ws-broken",
        "machine",
        Some(("8080/tcp", mk_server(8080, "http", ""))),
    );
    invalid
        .metadata
        .annotations
        .as_mut()
        .unwrap()
        .insert("org.eclipse.che.server.8080/tcp.port".into(), "eighty".into());
    let valid = mk_service(
        "ws-machine",
        "machine",
        Some(("9090/tcp", mk_server(9090, "http", ""))),
    );

    let resolver = InternalResolver::new(vec![invalid, valid]);
    let servers = resolver.resolve_internal_servers("machine");
    assert_eq!(servers.keys().collect::<Vec<_>>(), vec!["9090/tcp"]);
}

#[test]
fn later_service_wins() {
    let _tracing = init_tracing();
    let resolver = InternalResolver::new(vec![
        mk_service(
            "ws-first",
            "machine",
            Some(("8080/tcp", mk_server(8080, "http", "first"))),
        ),
        mk_service(
            "ws-second",
            "machine",
            Some(("8080/tcp", mk_server(8080, "ws", "second"))),
        ),
    ]);

    let servers = resolver.resolve_internal_servers("machine");
    assert_eq!(servers["8080/tcp"].host(), "ws-second");
    assert_eq!(servers["8080/tcp"].protocol(), "ws");
    assert_eq!(servers["8080/tcp"].path(), "second");
}
