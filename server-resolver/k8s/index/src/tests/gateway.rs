use super::*;
use crate::{GatewayResolver, NativeResolver};
use maplit::btreemap;
use std::sync::Arc;

const HOST: &str = "che.example.com";

fn mk_gateway_server(
    port: u16,
    path: &str,
    origin: Option<&str>,
    subdomain: bool,
) -> ServerConfig {
    let mut config = mk_server(port, "http", path);
    if let Some(origin) = origin {
        config = config.with_endpoint_origin(origin);
    }
    if subdomain {
        config = config.with_require_subdomain(true);
    }
    config
}

fn mk_resolver(
    services: Vec<k8s::Service>,
    ingresses: Vec<k8s::Ingress>,
    config_maps: Vec<k8s::ConfigMap>,
) -> GatewayResolver {
    let delegate = NativeResolver::new(services, ingresses, Arc::default());
    GatewayResolver::new(config_maps, HOST, delegate)
}

#[test]
fn server_under_endpoint_origin() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![mk_config_map(
            "gateway-m1",
            Some("m1"),
            Some(("api", mk_gateway_server(8080, "api", Some("/m1/"), false))),
        )],
    );

    let servers = resolver.resolve("m1");
    let server = &servers["api"];
    assert_eq!(server.host(), HOST);
    assert_eq!(server.path(), "/m1/api/");
    assert_eq!(server.endpoint_origin(), Some("/m1/"));
    assert_eq!(server.target_port(), 8080);
    assert_eq!(
        server.attributes(),
        &btreemap! { "endpointOrigin".to_string() => "/m1/".to_string() }
    );
}

#[test]
fn subdomain_server_is_served_from_root() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![mk_config_map(
            "gateway-m1",
            Some("m1"),
            vec![
                ("ide", mk_gateway_server(3100, "", Some("/m1/"), true)),
                ("term", mk_gateway_server(3200, "term", None, true)),
            ],
        )],
    );

    let servers = resolver.resolve("m1");
    assert_eq!(servers["ide"].path(), "/");
    assert_eq!(servers["ide"].endpoint_origin(), Some("/"));
    assert_eq!(servers["term"].path(), "/term/");
    assert_eq!(servers["term"].endpoint_origin(), Some("/"));
}

#[test]
fn missing_endpoint_origin_uses_root() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![mk_config_map(
            "gateway-m1",
            Some("m1"),
            Some(("api", mk_gateway_server(8080, "api", None, false))),
        )],
    );

    let servers = resolver.resolve("m1");
    assert_eq!(servers["api"].path(), "/api/");
    assert_eq!(servers["api"].endpoint_origin(), Some("/"));
}

#[test]
fn gateway_overlays_delegate_servers() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![mk_service(
            "ws-m1",
            "m1",
            vec![
                ("api", mk_server(8080, "http", "")),
                ("ide", mk_server(3100, "http", "")),
                ("debug", mk_server(5005, "tcp", "")),
            ],
        )],
        vec![mk_ingress(
            "ingress-m1",
            "m1",
            Some("m1.example.com"),
            "/m1/",
            vec![
                ("api", mk_server(8080, "http", "")),
                ("ide", mk_server(3100, "http", "")),
            ],
        )],
        vec![mk_config_map(
            "gateway-m1",
            Some("m1"),
            Some(("api", mk_gateway_server(8080, "", Some("/gw/m1/api/"), false))),
        )],
    );

    let servers = resolver.resolve("m1");
    assert_eq!(servers["api"].host(), HOST, "gateway servers override the delegate");
    assert_eq!(servers["api"].path(), "/gw/m1/api/");
    assert_eq!(servers["ide"].host(), "m1.example.com", "delegate servers are kept");
    assert_eq!(servers["ide"].endpoint_origin(), Some("/m1/"));
    assert_eq!(servers["debug"].host(), "ws-m1", "internal servers are kept");
}

#[test]
fn config_maps_without_machine_are_skipped() {
    let _tracing = init_tracing();
    let unrelated = k8s::ConfigMap {
        metadata: mk_meta("gateway-routes", BTreeMap::new()),
        data: Some(btreemap! { "routes.yaml".to_string() => "{}".to_string() }),
        ..Default::default()
    };
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![
            unrelated,
            mk_config_map(
                "orphan",
                None,
                Some(("api", mk_gateway_server(8080, "api", Some("/x/"), false))),
            ),
            mk_config_map(
                "gateway-m1",
                Some("m1"),
                Some(("api", mk_gateway_server(8080, "api", Some("/m1/"), false))),
            ),
        ],
    );

    assert_eq!(resolver.machine_names().collect::<Vec<_>>(), vec!["m1"]);
    assert_eq!(resolver.resolve("m1")["api"].path(), "/m1/api/");
}

#[test]
fn shared_host_for_every_machine() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![
            mk_config_map(
                "gateway-m1",
                Some("m1"),
                Some(("web", mk_gateway_server(8080, "", Some("/m1/"), false))),
            ),
            mk_config_map(
                "gateway-m2",
                Some("m2"),
                Some(("web", mk_gateway_server(8080, "", Some("/m2/"), false))),
            ),
        ],
    );

    let m1 = resolver.resolve("m1");
    let m2 = resolver.resolve("m2");
    assert_eq!(m1["web"].host(), m2["web"].host());
    assert_eq!(m1["web"].url(), "http://che.example.com/m1/");
    assert_eq!(m2["web"].url(), "http://che.example.com/m2/");
}

#[test]
fn later_config_map_wins() {
    let _tracing = init_tracing();
    let resolver = mk_resolver(
        vec![],
        vec![],
        vec![
            mk_config_map(
                "gateway-m1-a",
                Some("m1"),
                Some(("api", mk_gateway_server(8080, "api", Some("/a/"), false))),
            ),
            mk_config_map(
                "gateway-m1-b",
                Some("m1"),
                Some(("api", mk_gateway_server(8080, "api", Some("/b/"), false))),
            ),
        ],
    );

    let servers = resolver.resolve("m1");
    assert_eq!(servers["api"].path(), "/b/api/");
    assert_eq!(servers["api"].endpoint_origin(), Some("/b/"));
}

#[test]
fn unowned_services_are_indexed_once() {
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let _tracing = tracing::subscriber::set_default(subscriber);

    let unowned = k8s::Service {
        metadata: mk_meta("unowned", BTreeMap::new()),
        ..Default::default()
    };
    let resolver = mk_resolver(
        vec![unowned, mk_service("ws-m1", "m1", Some(("debug", mk_server(5005, "tcp", ""))))],
        vec![],
        vec![],
    );
    assert_eq!(resolver.resolve_internal_servers("m1")["debug"].host(), "ws-m1");

    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert_eq!(
        logs.matches("Object is not annotated with a machine name").count(),
        1,
        "{}",
        logs
    );
}
