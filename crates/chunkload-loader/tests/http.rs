use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use chunkload_loader::{CsvParser, HttpTransport, LoadError, Parse, Transport, partition_url};
use chunkload_query::Value;

const SCHOOLS: &str = "id,name,lat\n0601,Zamora Elementary,38.8\n0602,Zuni Middle,34.1\n";

/// Serve a few fixed paths over HTTP/1.1 on a loopback port.
fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                    break;
                }
            }

            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let (status, body) = match path {
                "/schools/06.csv" => ("200 OK", SCHOOLS),
                "/schools/broken.csv" => ("500 Internal Server Error", "boom"),
                _ => ("404 Not Found", "not found"),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}/schools")
}

#[test]
fn fetches_and_parses_a_partition() {
    let endpoint = start_server();
    let transport = HttpTransport::new();

    let text = transport.fetch(&partition_url(&endpoint, "06.csv")).unwrap();
    let records = CsvParser::default().parse(&text).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("name"), Some(&Value::from("Zuni Middle")));
    assert_eq!(records[1].get("lat"), Some(&Value::Number(34.1)));
}

#[test]
fn non_success_status_is_an_http_error() {
    let endpoint = start_server();
    let transport = HttpTransport::new();

    match transport.fetch(&partition_url(&endpoint, "missing.csv")) {
        Err(LoadError::Http { status, url }) => {
            assert_eq!(status, http::StatusCode::NOT_FOUND);
            assert!(url.ends_with("/schools/missing.csv"));
        }
        other => panic!("expected http error, got {other:?}"),
    }

    match transport.fetch(&partition_url(&endpoint, "broken.csv")) {
        Err(LoadError::Http { status, .. }) => {
            assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR)
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[test]
fn body_over_limit_is_a_transport_error() {
    let endpoint = start_server();
    let transport = HttpTransport::new().with_body_limit(8);

    let err = transport
        .fetch(&partition_url(&endpoint, "06.csv"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Transport { .. }));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpTransport::new()
        .fetch(&format!("http://{addr}/schools/06.csv"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Transport { .. }));
}
