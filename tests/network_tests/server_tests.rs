//! Server Tests
//!
//! Runs a store node on an ephemeral port and drives it through the TCP
//! transport and the raw protocol.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use colkv::network::{Server, ShutdownHandle};
use colkv::protocol::{
    encode_response, read_command, read_response, write_command, write_response, Command, Reply,
    Response,
};
use colkv::store::ColumnStore;
use colkv::{fields, CallOptions, Client, ClientConfig, ColError, TcpTransport, Transport, Value};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: SocketAddr,
    store: Arc<ColumnStore>,
    shutdown: ShutdownHandle,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let config = colkv::ServerConfig::builder()
            .listen_addr("127.0.0.1:0")
            .workers(2)
            .read_timeout_ms(2000)
            .build();
        let store = Arc::new(ColumnStore::new());
        let mut server = Server::new(config, Arc::clone(&store));
        let addr = server.bind().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.run().unwrap());

        Self {
            addr,
            store,
            shutdown,
            handle: Some(handle),
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .endpoint(self.addr.to_string())
            .keyspace("Twitter")
            .build()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn string_codecs() -> CallOptions {
    CallOptions::new().n_serializer("string").v_serializer("string")
}

// =============================================================================
// Client Round-Trip Tests
// =============================================================================

#[test]
fn test_write_then_read_over_tcp() {
    let server = TestServer::start();
    let config = server.client_config();
    let client = Client::connect(TcpTransport::new(&config), &config).unwrap();

    client
        .put_row("Statuses", "k", &fields([("a", "b"), ("c", "d")]), &CallOptions::new())
        .unwrap();

    let rows = client.get_rows("Statuses", &["k".into()], &string_codecs()).unwrap();
    assert_eq!(rows[&Value::from("k")][&Value::from("a")], Value::from("b"));
    assert_eq!(client.count_columns("Statuses", "k", &CallOptions::new()).unwrap(), 2);
    assert_eq!(server.store.row_count("Twitter", "Statuses"), 1);

    client.disconnect().unwrap();
}

#[test]
fn test_two_clients_share_the_node() {
    let server = TestServer::start();
    let config = server.client_config();
    let writer = Client::connect(TcpTransport::new(&config), &config).unwrap();
    let reader = Client::connect(TcpTransport::new(&config), &config).unwrap();

    writer
        .put_row("Statuses", "k", &fields([("a", "b")]), &CallOptions::new())
        .unwrap();
    writer
        .delete_columns("Statuses", "k", &["a".into()], &CallOptions::new())
        .unwrap();

    let rows = reader.get_rows("Statuses", &["k".into()], &string_codecs()).unwrap();
    assert!(rows[&Value::from("k")].is_empty());

    writer.disconnect().unwrap();
    reader.disconnect().unwrap();
}

#[test]
fn test_raw_ping() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    write_command(&mut stream, &Command::Ping).unwrap();
    let reply = read_response(&mut stream).unwrap().into_reply().unwrap();

    assert_eq!(reply, Reply::Pong);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_unreachable_endpoint_is_connection_error() {
    let addr = {
        let server = TestServer::start();
        server.addr
    };
    let config = ClientConfig::builder()
        .endpoint(addr.to_string())
        .connect_timeout_ms(500)
        .build();

    let result = Client::connect(TcpTransport::new(&config), &config);
    assert!(matches!(result, Err(ColError::Connection(_))));
}

#[test]
fn test_falls_back_to_next_endpoint() {
    let server = TestServer::start();
    let dead = {
        let other = TestServer::start();
        other.addr
    };
    let config = ClientConfig::builder()
        .endpoints([dead.to_string(), server.addr.to_string()])
        .keyspace("Twitter")
        .connect_timeout_ms(500)
        .build();

    let transport = TcpTransport::new(&config);
    let cluster = transport.connect("Test Cluster", &config.endpoints).unwrap();
    assert_eq!(cluster.endpoints().len(), 2);
    transport.disconnect(cluster).unwrap();
}

#[test]
fn test_handle_unusable_after_disconnect() {
    let server = TestServer::start();
    let config = server.client_config();
    let transport = TcpTransport::new(&config);

    let cluster = transport.connect("Test Cluster", &config.endpoints).unwrap();
    transport.disconnect(cluster.clone()).unwrap();

    assert!(matches!(
        transport.open_keyspace(&cluster, "Twitter"),
        Err(ColError::Connection(_))
    ));
}

#[test]
fn test_oversized_reply_is_remote_error_and_link_survives() {
    let server = TestServer::start();
    let config = server.client_config();
    let client = Client::connect(TcpTransport::new(&config), &config).unwrap();

    let big = vec![0xABu8; 6 * 1024 * 1024];
    for name in ["a", "b", "c"] {
        client
            .put_row("Blobs", "k", &fields([(name, big.clone())]), &CallOptions::new())
            .unwrap();
    }

    let result = client.get_rows("Blobs", &["k".into()], &CallOptions::new());
    match result {
        Err(ColError::Remote(msg)) => assert!(msg.contains("frame limit")),
        other => panic!("Expected Remote error, got {:?}", other.map(|rows| rows.len())),
    }

    // the stream stayed in sync, so the same handle keeps working
    assert_eq!(client.count_columns("Blobs", "k", &CallOptions::new()).unwrap(), 3);

    client.disconnect().unwrap();
}

#[test]
fn test_corrupt_reply_drops_the_link() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let node = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        assert_eq!(read_command(&mut stream).unwrap(), Command::Ping);
        write_response(&mut stream, &Response::ok(&Reply::Pong).unwrap()).unwrap();

        read_command(&mut stream).unwrap();
        let mut frame = encode_response(&Response::ok(&Reply::Written).unwrap());
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        std::io::Write::write_all(&mut stream, &frame).unwrap();
    });

    let config = ClientConfig::builder()
        .endpoint(addr.to_string())
        .keyspace("Twitter")
        .build();
    let client = Client::connect(TcpTransport::new(&config), &config).unwrap();

    let first = client.count_columns("Statuses", "k", &CallOptions::new());
    assert!(matches!(first, Err(ColError::Connection(msg)) if msg.contains("checksum")));

    let second = client.count_columns("Statuses", "k", &CallOptions::new());
    assert!(matches!(second, Err(ColError::Connection(msg)) if msg.contains("not connected")));

    node.join().unwrap();
}
