//! A tiny blocking HTTP server for tests.  It speaks just enough HTTP/1.1 to capture what the client sent and
//! answer with a canned status and body.
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Fixed { status: u16, body: String },
    /// Send the request body straight back.
    Echo { status: u16 },
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn read_headers(reader: &mut BufReader<TcpStream>) -> (Vec<(String, String)>, usize) {
    let mut headers = Vec::new();
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim().to_lowercase(), value.trim().to_string());
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    (headers, content_length)
}

fn read_http_request(stream: &TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(WAIT));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let (headers, content_length) = read_headers(&mut reader);
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read body");

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Answers every request it gets with the same [`Reply`], recording each one.
pub struct MockServer {
    addr: SocketAddr,
    requests: mpsc::Receiver<CapturedRequest>,
}

impl MockServer {
    pub fn start(reply: Reply) -> MockServer {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener has address");
        let (tx, requests) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    break;
                };
                let captured = read_http_request(&stream);
                match &reply {
                    Reply::Fixed { status, body } => write_response(&mut stream, *status, body),
                    Reply::Echo { status } => write_response(&mut stream, *status, &captured.body),
                }
                if tx.send(captured).is_err() {
                    break;
                }
            }
        });

        MockServer { addr, requests }
    }

    pub fn respond(status: u16, body: &str) -> MockServer {
        MockServer::start(Reply::Fixed {
            status,
            body: body.to_string(),
        })
    }

    pub fn echo(status: u16) -> MockServer {
        MockServer::start(Reply::Echo { status })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn next_request(&self) -> CapturedRequest {
        self.requests.recv_timeout(WAIT).expect("request")
    }

    pub fn assert_no_more_requests(&self) {
        thread::sleep(Duration::from_millis(100));
        assert!(
            self.requests.try_recv().is_err(),
            "server saw more requests than expected"
        );
    }
}

/// A bound socket nobody accepts on, for proving that no connection was attempted.
pub struct IdleServer {
    listener: TcpListener,
}

impl IdleServer {
    pub fn new() -> IdleServer {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        listener.set_nonblocking(true).expect("set nonblocking");
        IdleServer { listener }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.listener.local_addr().expect("listener has address"))
    }

    pub fn assert_untouched(&self) {
        match self.listener.accept() {
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Ok((_, peer)) => panic!("unexpected connection from {}", peer),
            Err(e) => panic!("accept failed: {:?}", e),
        }
    }
}

impl Default for IdleServer {
    fn default() -> Self {
        IdleServer::new()
    }
}

/// A URL whose port had a listener a moment ago and now refuses connections.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    drop(listener);
    format!("http://{}", addr)
}
