use ball_capture_common::command::{SaveCommand, SaveResponse, MAX_RESPONSE_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RemoteSaveError {
    #[error("command socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command server closed the connection")]
    Closed,
    #[error("response was not valid UTF-8")]
    BadEncoding,
    #[error("robot refused to save: {0}")]
    Rejected(String),
}

/// Client for the robot's save command socket.
///
/// One request, one response per call. The response read has no timeout by
/// design: a hung server stalls the command, never the stream display.
pub struct RemoteSaveClient {
    stream: TcpStream,
}

impl RemoteSaveClient {
    pub async fn connect(addr: &str) -> Result<Self, RemoteSaveError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self { stream })
    }

    /// Send a save command and wait for the acknowledgment. On success the
    /// returned string is the path the robot saved the image under.
    pub async fn save(&mut self, command: &SaveCommand) -> Result<String, RemoteSaveError> {
        self.stream.write_all(command.encode().as_bytes()).await?;

        let mut buf = [0u8; MAX_RESPONSE_SIZE];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Err(RemoteSaveError::Closed);
        }
        let text = std::str::from_utf8(&buf[..n]).map_err(|_| RemoteSaveError::BadEncoding)?;

        match SaveResponse::parse(text) {
            SaveResponse::Saved { path } => Ok(path),
            SaveResponse::Error { message } => Err(RemoteSaveError::Rejected(message)),
        }
    }
}

/// Seam between the synchronous display loop and the robot-side save path,
/// so save coordination can be tested without a live socket.
pub trait RemoteSaver {
    /// Attempt a remote save, reporting success. Failures are logged for the
    /// operator, never raised.
    fn save(&mut self, filename: Option<&str>) -> bool;
}

/// [`RemoteSaver`] backed by a [`RemoteSaveClient`], driven to completion on
/// the caller's thread through a runtime handle.
pub struct BlockingRemoteSaver {
    handle: tokio::runtime::Handle,
    client: RemoteSaveClient,
}

impl BlockingRemoteSaver {
    pub fn new(handle: tokio::runtime::Handle, client: RemoteSaveClient) -> Self {
        Self { handle, client }
    }
}

impl RemoteSaver for BlockingRemoteSaver {
    fn save(&mut self, filename: Option<&str>) -> bool {
        let command = match filename {
            Some(name) => SaveCommand::with_filename(name),
            None => SaveCommand::new(),
        };
        match self.handle.block_on(self.client.save(&command)) {
            Ok(path) => {
                info!(path, "image saved on robot");
                true
            }
            Err(e) => {
                warn!(error = %e, "remote save failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// One-shot command server: asserts the expected request, sends a canned
    /// response.
    async fn spawn_server(expect: &'static str, reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), expect);
            sock.write_all(reply.as_bytes()).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn save_without_filename_extracts_remote_path() {
        let addr = spawn_server("SAVE", "SAVED:/data/img001.jpg").await;
        let mut client = RemoteSaveClient::connect(&addr).await.unwrap();
        let path = client.save(&SaveCommand::new()).await.unwrap();
        assert_eq!(path, "/data/img001.jpg");
    }

    #[tokio::test]
    async fn save_with_filename_sends_it_on_the_wire() {
        let addr = spawn_server("SAVE:shot.jpg", "SAVED:/data/shot.jpg").await;
        let mut client = RemoteSaveClient::connect(&addr).await.unwrap();
        let path = client
            .save(&SaveCommand::with_filename("shot.jpg"))
            .await
            .unwrap();
        assert_eq!(path, "/data/shot.jpg");
    }

    #[tokio::test]
    async fn error_response_surfaces_full_text() {
        let addr = spawn_server("SAVE", "ERROR:disk full").await;
        let mut client = RemoteSaveClient::connect(&addr).await.unwrap();
        let err = client.save(&SaveCommand::new()).await.unwrap_err();
        match err {
            RemoteSaveError::Rejected(message) => assert_eq!(message, "ERROR:disk full"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_socket_reports_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = sock.read(&mut buf).await.unwrap();
            // drop without replying
        });
        let mut client = RemoteSaveClient::connect(&addr).await.unwrap();
        let err = client.save(&SaveCommand::new()).await.unwrap_err();
        assert!(matches!(err, RemoteSaveError::Closed));
    }
}
