use std::io::Read;

use httpmock::prelude::*;
use uc::config::Config;
use uc::error::UCError;
use uc::http::HttpDownloader;
use uc::io::Downloader;
use uc::proxy::FixedProxySelector;
use url::Url;

fn open(url: &str) -> uc::Result<Option<String>> {
    let downloader =
        HttpDownloader::new(&Config::default(), &FixedProxySelector::direct()).unwrap();
    let stream = downloader.open_stream(&Url::parse(url).unwrap())?;
    Ok(stream.map(|mut stream| {
        let mut body = String::new();
        stream.read_to_string(&mut body).unwrap();
        body
    }))
}

#[test]
fn test_http_downloader_opens_stream() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/update-center.properties")
            .header_exists("user-agent");
        then.status(200).body("plugins=java\njava.versions=1.0\n");
    });
    let body = open(&server.url("/update-center.properties")).unwrap();
    assert_eq!(Some("plugins=java\njava.versions=1.0\n".to_string()), body);
    server_mock.assert();
}

#[test]
fn test_http_downloader_no_content_is_no_data() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/update-center.properties");
        then.status(204);
    });
    let body = open(&server.url("/update-center.properties")).unwrap();
    assert!(body.is_none());
    server_mock.assert();
}

#[test]
fn test_http_downloader_not_found_is_no_data() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/update-center.properties");
        then.status(404).body("not found");
    });
    let body = open(&server.url("/update-center.properties")).unwrap();
    assert!(body.is_none());
    server_mock.assert();
}

#[test]
fn test_http_downloader_server_error_is_transport_error() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/update-center.properties");
        then.status(500).body("boom");
    });
    let err = open(&server.url("/update-center.properties")).unwrap_err();
    match err.downcast_ref::<UCError>() {
        Some(UCError::TransportError(msg)) => assert!(msg.starts_with("Status 500")),
        _ => panic!("Expected TransportError"),
    }
    server_mock.assert();
}

#[test]
fn test_http_downloader_server_down_is_transport_error() {
    let err = open("http://localhost:8091/update-center.properties").unwrap_err();
    match err.downcast_ref::<UCError>() {
        Some(UCError::TransportError(_)) => (),
        _ => panic!("Expected TransportError"),
    }
}
