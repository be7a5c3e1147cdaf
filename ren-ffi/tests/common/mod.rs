//! In-process HTTP fake of the Ren backend for C ABI tests.

#![allow(dead_code)]

use std::ffi::{CStr, CString, c_char};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};

pub const TOKEN: &str = "tok-user123";

/// A request as seen by the fake.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    fn is_authorized(&self) -> bool {
        self.authorization.as_deref() == Some(format!("Bearer {TOKEN}").as_str())
    }
}

/// What the fake answers.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self::text(status, &body.to_string())
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A listening fake. Each connection is served on its own thread.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route = Arc::new(route);

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let seen = Arc::clone(&seen);
                let route = Arc::clone(&route);
                thread::spawn(move || {
                    let Some(request) = read_http_request(&mut stream) else {
                        return;
                    };
                    seen.lock().push(request.clone());
                    let reply = route(&request);
                    if !reply.delay.is_zero() {
                        thread::sleep(reply.delay);
                    }
                    write_http_response(&mut stream, reply.status, reply.body.as_bytes());
                });
            }
        });

        Self { addr, requests }
    }

    /// The fake answering like the real backend for `user123` / `password`.
    pub fn backend() -> Self {
        Self::start(backend_route)
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn c_endpoint(&self) -> CString {
        CString::new(self.endpoint()).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

pub fn user_json() -> Value {
    json!({"id": 42, "login": "user123", "username": "User", "avatar": null})
}

pub fn backend_route(request: &Recorded) -> Reply {
    let unauthorized = || Reply::text(401, "missing or invalid token");
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/auth/login") => {
            let body = request.json();
            if body["login"] == "user123" && body["password"] == "password" {
                Reply::json(
                    200,
                    &json!({"message": "Login successful", "token": TOKEN, "user": user_json()}),
                )
            } else {
                Reply::text(401, "Invalid login or password")
            }
        }
        ("GET", "/users/me") if request.is_authorized() => Reply::json(200, &user_json()),
        ("DELETE", "/users/me") if request.is_authorized() => Reply::text(204, ""),
        ("GET", "/chats") if request.is_authorized() => Reply::json(
            200,
            &json!([{
                "id": 1, "kind": "private", "title": null,
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z",
                "is_archived": false, "peer_avatar": null, "peer_username": "bob"
            }]),
        ),
        ("GET", "/chats/1/messages") if request.is_authorized() => Reply::json(
            200,
            &json!([{
                "id": 10, "chat_id": 1, "sender_id": 7, "message": "Y2lwaGVy",
                "message_type": "text", "created_at": "2024-01-02T00:00:00Z",
                "edited_at": null, "is_read": false, "has_files": false,
                "metadata": null, "envelopes": null, "status": null
            }]),
        ),
        ("GET", "/users/7/public-key") => {
            Reply::json(200, &json!({"user_id": 7, "public_key": "cHVibGlj"}))
        }
        ("PATCH", "/users/username") if request.is_authorized() => {
            let mut user = user_json();
            user["username"] = request.json()["username"].clone();
            Reply::json(200, &user)
        }
        ("POST", "/chats") if request.is_authorized() => Reply::json(
            201,
            &json!({
                "id": 2, "kind": request.json()["kind"], "title": request.json()["title"],
                "created_at": "2024-01-03T00:00:00Z", "updated_at": "2024-01-03T00:00:00Z",
                "peer_username": "carol"
            }),
        ),
        ("DELETE", path) if path.starts_with("/chats/1") && request.is_authorized() => {
            Reply::text(204, "")
        }
        ("DELETE", path) if path.starts_with("/chats/") && request.is_authorized() => {
            Reply::text(404, "chat not found")
        }
        (_, "/users/me" | "/chats" | "/users/username") => unauthorized(),
        _ => Reply::text(404, "not found"),
    }
}

/// Copy an owned SDK string and release it.
pub unsafe fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null(), "expected a string, last error: {}", last_error());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
    unsafe { ren_sdk::ren_sdk_free_string(ptr) };
    text
}

/// Parse an owned SDK JSON string and release it.
pub unsafe fn take_json(ptr: *mut c_char) -> Value {
    serde_json::from_str(&unsafe { take_string(ptr) }).unwrap()
}

/// Last error message of this thread.
pub fn last_error() -> String {
    let len = ren_sdk::ren_sdk_last_error_length();
    if len == 0 {
        return String::new();
    }
    let mut buf = vec![0 as c_char; usize::try_from(len).unwrap()];
    unsafe { ren_sdk::ren_sdk_last_error_message(buf.as_mut_ptr(), len) };
    unsafe { CStr::from_ptr(buf.as_ptr()) }.to_str().unwrap().to_owned()
}

/// Release the message of an envelope and return its code and text.
pub unsafe fn take_result(result: ren_sdk::RenResult) -> (i32, String) {
    let message = if result.message.is_null() {
        String::new()
    } else {
        unsafe { take_string(result.message) }
    };
    (result.code, message)
}

fn read_http_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut bytes = Vec::new();
    let mut header_end = None;
    let mut content_length = 0usize;

    loop {
        let mut buf = [0u8; 1024];
        let read = stream.read(&mut buf).ok()?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&buf[..read]);

        if header_end.is_none() {
            header_end = find_header_end(&bytes);
            if let Some(pos) = header_end {
                let headers = String::from_utf8_lossy(&bytes[..pos]);
                content_length = header_value(&headers, "content-length")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
        }

        if header_end.is_some_and(|pos| bytes.len() >= pos + 4 + content_length) {
            break;
        }
    }

    let header_end = header_end?;
    let headers = String::from_utf8_lossy(&bytes[..header_end]).into_owned();
    let mut parts = headers.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let path = parts.next().unwrap_or_default().to_owned();
    let body = String::from_utf8_lossy(&bytes[header_end + 4..]).into_owned();

    Some(Recorded {
        method,
        path,
        authorization: header_value(&headers, "authorization"),
        body,
    })
}

fn write_http_response(stream: &mut TcpStream, status_code: u16, body: &[u8]) {
    let status_text = match status_code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let header = format!(
        "HTTP/1.1 {status_code} {status_text}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n")
}

fn header_value(headers: &str, name: &str) -> Option<String> {
    headers.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_owned())
    })
}
