//! Submitting moves to the server that keeps the game record
//!
//! The server exposes a single endpoint, `POST /move`, taking the form fields `id` (the game) and
//! `move`, and answering with a JSON object whose `successful` field says whether it recorded the
//! move.

use std::{io, time::Duration};

use serde::Deserialize;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("error talking to the server: {0}")]
    Transport(#[from] Box<ureq::Error>),
    #[error("error reading the server's response: {0}")]
    Read(#[from] io::Error),
    #[error("server response was not understood: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What the server decided about a submitted move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Accepted,
    Rejected,
}

/// How moves are written in the `move` field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveEncoding {
    /// Standard algebraic notation, like `Nxe5+`
    #[default]
    San,
    /// Origin and destination squares with an optional promotion letter, like `e7e8q`
    Coordinate,
}

/// A move to record in a game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub game_id: String,
    /// The move, already written in the server's [`MoveEncoding`]
    pub mv: String,
}

impl MoveRequest {
    /// The form fields sent to the server
    pub fn form(&self) -> [(&str, &str); 2] {
        [("id", self.game_id.as_str()), ("move", self.mv.as_str())]
    }
}

/// The body the server answers with
///
/// A missing `successful` field counts as a rejection.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MoveResponse {
    #[serde(default)]
    pub successful: bool,
}

impl From<MoveResponse> for CommitOutcome {
    fn from(response: MoveResponse) -> Self {
        if response.successful {
            CommitOutcome::Accepted
        } else {
            CommitOutcome::Rejected
        }
    }
}

/// Something that can record moves
///
/// This is generic over how the moves get there, so a real server and a test double can both
/// implement it. Calls may block; the controller runs them off its own thread.
pub trait MoveServer {
    /// Ask the server to record the move
    fn submit_move(&self, request: &MoveRequest) -> Result<CommitOutcome>;
}

/// A [`MoveServer`] reached over HTTP
pub struct HttpMoveServer {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpMoveServer {
    /// Talk to the server at `base_url`, giving up on any request after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint: format!("{}/move", base_url.trim_end_matches('/')),
        }
    }

    /// The URL moves are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MoveServer for HttpMoveServer {
    fn submit_move(&self, request: &MoveRequest) -> Result<CommitOutcome> {
        tracing::debug!(endpoint = %self.endpoint, game = %request.game_id, mv = %request.mv, "posting move");
        let body = self
            .agent
            .post(&self.endpoint)
            .send_form(&request.form())
            .map_err(Box::new)?
            .into_string()?;
        let response: MoveResponse = serde_json::from_str(&body)?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::TcpListener,
        thread,
    };

    /// Serve exactly one request with the given status line and body, handing back the request
    /// body that was received
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0;
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            assert!(request_line.starts_with("POST /move "), "{request_line}");
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut received = vec![0; content_length];
            reader.read_exact(&mut received).unwrap();
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            String::from_utf8(received).unwrap()
        });
        (url, handle)
    }

    fn request(mv: &str) -> MoveRequest {
        MoveRequest {
            game_id: "17".to_string(),
            mv: mv.to_string(),
        }
    }

    #[test]
    fn test_response_decoding() {
        let accepted: MoveResponse = serde_json::from_str(r#"{"successful": true}"#).unwrap();
        assert_eq!(CommitOutcome::from(accepted), CommitOutcome::Accepted);
        let rejected: MoveResponse = serde_json::from_str(r#"{"successful": false}"#).unwrap();
        assert_eq!(CommitOutcome::from(rejected), CommitOutcome::Rejected);
        let missing: MoveResponse = serde_json::from_str(r#"{"error": "not your turn"}"#).unwrap();
        assert_eq!(CommitOutcome::from(missing), CommitOutcome::Rejected);
    }

    #[test]
    fn test_endpoint() {
        let server = HttpMoveServer::new("http://localhost:5000/", Duration::from_secs(1));
        assert_eq!(server.endpoint(), "http://localhost:5000/move");
    }

    #[test]
    fn test_accepted_over_http() {
        let (url, handle) = serve_once("200 OK", r#"{"successful": true}"#);
        let server = HttpMoveServer::new(&url, Duration::from_secs(5));
        let outcome = server.submit_move(&request("Nf3")).unwrap();
        assert_eq!(outcome, CommitOutcome::Accepted);
        assert_eq!(handle.join().unwrap(), "id=17&move=Nf3");
    }

    #[test]
    fn test_rejected_over_http() {
        let (url, handle) = serve_once("200 OK", r#"{"successful": false}"#);
        let server = HttpMoveServer::new(&url, Duration::from_secs(5));
        let outcome = server.submit_move(&request("e4")).unwrap();
        assert_eq!(outcome, CommitOutcome::Rejected);
        handle.join().unwrap();
    }

    #[test]
    fn test_form_is_url_encoded() {
        let (url, handle) = serve_once("200 OK", r#"{"successful": true}"#);
        let server = HttpMoveServer::new(&url, Duration::from_secs(5));
        server.submit_move(&request("Qh4#")).unwrap();
        assert_eq!(handle.join().unwrap(), "id=17&move=Qh4%23");
    }

    #[test]
    fn test_server_error_status() {
        let (url, handle) = serve_once("500 Internal Server Error", "{}");
        let server = HttpMoveServer::new(&url, Duration::from_secs(5));
        assert!(matches!(
            server.submit_move(&request("e4")),
            Err(Error::Transport(_))
        ));
        handle.join().unwrap();
    }

    #[test]
    fn test_garbled_response() {
        let (url, handle) = serve_once("200 OK", "<html>oops</html>");
        let server = HttpMoveServer::new(&url, Duration::from_secs(5));
        assert!(matches!(
            server.submit_move(&request("e4")),
            Err(Error::Decode(_))
        ));
        handle.join().unwrap();
    }
}
