#![allow(dead_code)]

pub mod test_server {
    use std::net::{SocketAddr, TcpListener};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Once};
    use survey_intake::server::{HttpServer, ServerHandle, SurveyService};
    use survey_intake::store::{CorruptStorePolicy, JsonFileStore, StoreWriter};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x10000);
        });
    }

    /// A running survey service backed by a store in its own temp directory.
    ///
    /// The server is stopped and the directory removed on drop.
    pub struct SurveyTestServer {
        handle: Option<ServerHandle>,
        addr: SocketAddr,
        store: JsonFileStore,
        _dir: tempfile::TempDir,
    }

    impl SurveyTestServer {
        pub fn new() -> Self {
            Self::with_store(CorruptStorePolicy::Reject, None)
        }

        /// Start a server whose store file already holds `existing` (if any).
        pub fn with_store(policy: CorruptStorePolicy, existing: Option<&str>) -> Self {
            setup_may_runtime();
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::new(
                dir.path().join("data"),
                "survey_submissions.json",
                policy,
            );
            if let Some(contents) = existing {
                std::fs::create_dir_all(store.data_dir()).unwrap();
                std::fs::write(store.path(), contents).unwrap();
            }

            let writer = unsafe { StoreWriter::spawn(store.clone(), 0x10000).unwrap() };
            let service = SurveyService::new(Arc::new(writer));

            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();

            Self {
                handle: Some(handle),
                addr,
                store,
                _dir: dir,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        pub fn store_path(&self) -> &Path {
            self.store.path()
        }

        pub fn data_dir(&self) -> PathBuf {
            self.store.data_dir().to_path_buf()
        }

        /// Current store contents parsed as raw JSON.
        pub fn stored(&self) -> serde_json::Value {
            let text = std::fs::read_to_string(self.store.path()).unwrap();
            serde_json::from_str(&text).unwrap()
        }
    }

    impl Drop for SurveyTestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod http {
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::{Duration, Instant};

    /// Send a raw request and read one response.
    ///
    /// Stops reading once `Content-Length` bytes of body have arrived, or after
    /// two seconds.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 4096];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&tmp[..n]);
                    if response_complete(&buf) {
                        break;
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    if Instant::now() >= deadline {
                        break;
                    }
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn response_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some((headers, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = headers.lines().find_map(|line| {
            let (name, val) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| val.trim().parse::<usize>().ok())
                .flatten()
        });
        match content_length {
            Some(len) => body.len() >= len,
            None => false,
        }
    }

    pub fn parse_response(resp: &str) -> (u16, Value) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let headers = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("");
        let mut status = 0;
        for line in headers.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            }
        }
        let json: Value = serde_json::from_str(body).unwrap_or_default();
        (status, json)
    }

    pub fn header_value(resp: &str, name: &str) -> Option<String> {
        let headers = resp.split("\r\n\r\n").next().unwrap_or("");
        headers.lines().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }

    /// POST `body` to `path` with a JSON content type.
    pub fn post_json(addr: &SocketAddr, path: &str, body: &str) -> (u16, Value) {
        let req = format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        parse_response(&send_request(addr, &req))
    }

    pub fn get(addr: &SocketAddr, path: &str) -> (u16, Value) {
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        parse_response(&send_request(addr, &req))
    }
}
