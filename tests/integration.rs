//! Integration tests: plugin lifecycle against a recording transport and a
//! local one-shot HTTP responder.

use blynk_notify::config::default_category;
use blynk_notify::models::{DeliveryRequest, TriggerReason};
use blynk_notify::{
    plugin_from_env, ConfigCategory, DeliveryConfig, HttpTransport, Plugin, Transport,
    TransportError,
};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn category(token: &str, pin: &str, url: &str) -> ConfigCategory {
    default_category()
        .with_value("token", token)
        .with_value("pin", pin)
        .with_value("api_url", url)
        .with_value("enable", "true")
}

/// Accepts one connection, answers with `status_line`, returns the request line.
fn serve_once(status_line: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            let n = reader.read_line(&mut header).unwrap();
            if n == 0 || header == "\r\n" {
                break;
            }
        }
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status_line
        )
        .unwrap();
        stream.flush().unwrap();
        request_line.trim_end().to_string()
    });
    (format!("http://{}", addr), handle)
}

#[test]
fn http_delivery_succeeds_on_200() {
    let (base, server) = serve_once("200 OK");
    let plugin = Plugin::init(&category("TOKEN", "V1", &format!("{}/api/", base)));

    assert!(plugin.deliver("delivery", "overheat", r#"{"reason":"triggered"}"#, "hot"));
    assert_eq!(
        server.join().unwrap(),
        "GET /api/TOKEN/update/V1?value=1&reason=triggered&notification=overheat HTTP/1.1"
    );
}

#[test]
fn http_delivery_fails_on_non_200() {
    for status in ["401 Unauthorized", "500 Internal Server Error"] {
        let (base, server) = serve_once(status);
        let plugin = Plugin::init(&category("TOKEN", "V1", &base));
        assert!(!plugin.deliver("delivery", "n", r#"{"reason":"cleared"}"#, ""));
        assert_eq!(
            server.join().unwrap(),
            "GET /TOKEN/update/V1?value=0&reason=cleared&notification=n HTTP/1.1"
        );
    }
}

#[test]
fn logged_url_matches_request_line() {
    let (base, server) = serve_once("200 OK");
    let cat = category("TOKEN", "V1", &base);
    let request = DeliveryRequest::build(
        &DeliveryConfig::from_category(&cat),
        &TriggerReason::Triggered,
        "tank level#2",
    )
    .unwrap();

    let plugin = Plugin::init(&cat);
    assert!(plugin.deliver("d", "tank level#2", r#"{"reason":"triggered"}"#, ""));
    assert_eq!(server.join().unwrap(), format!("GET {} HTTP/1.1", request.path));
    assert_eq!(
        request.path,
        "/TOKEN/update/V1?value=1&reason=triggered&notification=tank%20level%232"
    );
}

#[test]
fn silent_server_is_a_response_timeout() {
    // Connections complete in the kernel backlog without accept().
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let config = DeliveryConfig::from_category(&category("T", "P", &format!("http://{}", addr)));
    let mut request = DeliveryRequest::build(&config, &TriggerReason::Triggered, "n").unwrap();
    request.timeout = Duration::from_millis(300);

    let started = Instant::now();
    let err = HttpTransport::new().get(&request).unwrap_err();
    assert!(matches!(err, TransportError::ResponseTimeout), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(listener);
}

#[test]
fn connection_refused_is_a_transport_error() {
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let config = DeliveryConfig::from_category(&category("T", "P", &format!("http://{}", addr)));
    let request = DeliveryRequest::build(&config, &TriggerReason::Triggered, "n").unwrap();

    let err = HttpTransport::new().get(&request).unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "{err:?}");

    let plugin = Plugin::init(&category("T", "P", &format!("http://{}", addr)));
    assert!(!plugin.deliver("d", "n", r#"{"reason":"triggered"}"#, ""));
}

/// Records every request url and answers 200.
#[derive(Default)]
struct RecordingTransport {
    urls: Mutex<Vec<String>>,
}

impl Transport for RecordingTransport {
    fn get(&self, request: &DeliveryRequest) -> Result<u16, TransportError> {
        self.urls.lock().unwrap().push(request.url());
        Ok(200)
    }
}

/// Reports the request, then blocks until released.
struct GateTransport {
    seen: Mutex<mpsc::Sender<String>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Transport for GateTransport {
    fn get(&self, request: &DeliveryRequest) -> Result<u16, TransportError> {
        self.seen.lock().unwrap().send(request.url()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(200)
    }
}

#[test]
fn in_flight_delivery_keeps_its_snapshot() {
    let (seen_tx, seen_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let transport = Arc::new(GateTransport {
        seen: Mutex::new(seen_tx),
        release: Mutex::new(release_rx),
    });
    let plugin = Arc::new(Plugin::with_transport(
        &category("OLD", "V1", "http://old.example"),
        transport,
    ));

    let worker = {
        let plugin = plugin.clone();
        thread::spawn(move || plugin.deliver("d", "n", r#"{"reason":"triggered"}"#, ""))
    };

    let first = seen_rx.recv().unwrap();
    plugin.reconfigure(&category("NEW", "V2", "https://new.example:8443").to_json());
    release_tx.send(()).unwrap();
    assert!(worker.join().unwrap());
    assert_eq!(
        first,
        "http://old.example/OLD/update/V1?value=1&reason=triggered&notification=n"
    );

    release_tx.send(()).unwrap();
    assert!(plugin.deliver("d", "n", r#"{"reason":"cleared"}"#, ""));
    assert_eq!(
        seen_rx.recv().unwrap(),
        "https://new.example:8443/NEW/update/V2?value=0&reason=cleared&notification=n"
    );
}

#[test]
fn concurrent_reconfigure_never_mixes_fields() {
    let transport = Arc::new(RecordingTransport::default());
    let a = category("TA", "PA", "http://a.example");
    let b = category("TB", "PB", "https://b.example:9000/x");
    let plugin = Arc::new(Plugin::with_transport(&a, transport.clone()));

    let reconfigurer = {
        let plugin = plugin.clone();
        let (a, b) = (a.to_json(), b.to_json());
        thread::spawn(move || {
            for i in 0..500 {
                plugin.reconfigure(if i % 2 == 0 { &b } else { &a });
            }
        })
    };
    let senders: Vec<_> = (0..4)
        .map(|_| {
            let plugin = plugin.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    assert!(plugin.deliver("d", "n", r#"{"reason":"triggered"}"#, ""));
                }
            })
        })
        .collect();

    reconfigurer.join().unwrap();
    for sender in senders {
        sender.join().unwrap();
    }

    let urls = transport.urls.lock().unwrap();
    assert_eq!(urls.len(), 800);
    for url in urls.iter() {
        assert!(
            url == "http://a.example/TA/update/PA?value=1&reason=triggered&notification=n"
                || url
                    == "https://b.example:9000/xTB/update/PB?value=1&reason=triggered&notification=n",
            "mixed configuration: {url}"
        );
    }
}

#[test]
fn disabling_by_reconfigure_stops_delivery() {
    let transport = Arc::new(RecordingTransport::default());
    let plugin = Plugin::with_transport(&category("T", "P", "http://h"), transport.clone());
    assert!(plugin.deliver("d", "n", r#"{"reason":"triggered"}"#, ""));

    let disabled = category("T", "P", "http://h").with_value("enable", "1");
    plugin.reconfigure(&disabled.to_json());
    assert!(!plugin.deliver("d", "n", r#"{"reason":"triggered"}"#, ""));
    assert!(!plugin.deliver("d", "n", "{bad json", ""));
    assert_eq!(transport.urls.lock().unwrap().len(), 1);
    plugin.shutdown();
}

#[test]
fn plugin_from_env_reads_blynk_variables() {
    std::env::set_var("BLYNK_TOKEN", "ENV");
    std::env::set_var("BLYNK_PIN", "V3");
    std::env::set_var("BLYNK_API_URL", "http://env.example");
    std::env::set_var("BLYNK_ENABLE", "True");
    let plugin = plugin_from_env();
    for var in ["BLYNK_TOKEN", "BLYNK_PIN", "BLYNK_API_URL", "BLYNK_ENABLE"] {
        std::env::remove_var(var);
    }

    let config = plugin.adapter().config();
    assert!(config.enabled);
    assert_eq!(config.token, "ENV");
    assert_eq!(config.pin, "V3");
    assert_eq!(config.api_url, "http://env.example");
}
