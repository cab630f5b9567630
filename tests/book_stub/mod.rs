#![allow(dead_code)]

use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

pub const BOOK_TITLE: &str =
    "Тестовая книга: том 1 (слушать аудиокнигу бесплатно) - автор Иван Петров";

pub const TRACK_1: &[u8] = b"ID3\x03track-one";
pub const TRACK_2: &[u8] = b"ID3\x03track-two, served after a redirect";
pub const TRACK_3: &[u8] = b"ID3\x03track-three";

/// Serves a fake audiobook site. Track URLs inside the pages are plain `http:`
/// and JSON-escaped the way the real player config is.
pub struct BookStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BookStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start book stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");
        let escaped_base = base_url.replace('/', "\\/");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let page_base = base_url.clone();
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                seen.lock().expect("lock request log").push(path.clone());

                let response = match path.as_str() {
                    "/book" => html(&book_page(&escaped_base, &["1", "0", "redirect", "3"])),
                    "/broken-book" => html(&book_page(&escaped_base, &["1", "missing", "3"])),
                    "/cdn-book" => html(&book_page(
                        r"https:\/\/cdn.example.com",
                        &["1", "0", "2"],
                    )),
                    "/cp1251-book" => {
                        let page = book_page(&escaped_base, &["1", "3"]).replace(
                            "<head>",
                            r#"<head><meta charset="windows-1251">"#,
                        );
                        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(&page);
                        tiny_http::Response::from_data(bytes.into_owned())
                            .with_header(header("Content-Type", "text/html"))
                    }
                    "/no-tracks" => html(&format!(
                        "<!doctype html><html><head><title>{BOOK_TITLE}</title></head>\
                         <body><script>var player = null;</script></body></html>"
                    )),
                    "/odd-title" => html(&format!(
                        "<!doctype html><html><head><title>Just a page</title></head>\
                         <body><script>var t = \"{escaped_base}\\/audio\\/1.mp3\";</script></body></html>"
                    )),
                    "/audio/1.mp3" => audio(TRACK_1),
                    "/audio/2.mp3" => audio(TRACK_2),
                    "/audio/3.mp3" => audio(TRACK_3),
                    "/audio/redirect.mp3" => {
                        let location = format!("{page_base}/audio/2.mp3");
                        tiny_http::Response::from_data(Vec::new())
                            .with_status_code(302)
                            .with_header(header("Location", &location))
                    }
                    "/audio/0.mp3" => tiny_http::Response::from_data(
                        b"placeholder must never be fetched".to_vec(),
                    )
                    .with_status_code(500),
                    _ => tiny_http::Response::from_data(b"not found".to_vec()).with_status_code(404),
                };

                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn requested(&self, path: &str) -> bool {
        self.requests
            .lock()
            .expect("lock request log")
            .iter()
            .any(|p| p == path)
    }
}

impl Drop for BookStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// An earlier script mentions an mp3 too; only the last one carries the playlist.
fn book_page(escaped_base: &str, tracks: &[&str]) -> String {
    let items = tracks
        .iter()
        .map(|name| format!(r#"{{"url":"{escaped_base}\/audio\/{name}.mp3"}}"#))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"<!doctype html>
<html>
  <head>
    <title>{BOOK_TITLE}</title>
    <script>var jingle = "{escaped_base}\/promo\/jingle.mp3";</script>
  </head>
  <body>
    <h1>Тестовая книга</h1>
    <script>var player = {{"items":[{items}]}};</script>
    <script>var analytics = true;</script>
  </body>
</html>
"#
    )
}

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("build header")
}

fn html(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_data(body.as_bytes().to_vec())
        .with_header(header("Content-Type", "text/html; charset=utf-8"))
}

fn audio(bytes: &[u8]) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_data(bytes.to_vec()).with_header(header("Content-Type", "audio/mpeg"))
}
