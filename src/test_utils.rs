//! Test utilities shared by unit tests and, behind the `test-utils`
//! feature, by the integration tests
//!
//! `StubServer` answers plain HTTP/1.1 GETs from a fixed route table so that
//! network-facing code can be exercised without leaving the machine.
//! `TestDatabase` hands out a throwaway SQLite file.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::infrastructure::{DatabaseConnection, ProductStore};

type Routes = Arc<HashMap<String, (u16, String)>>;

pub struct StubServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Serve `(target, status, body)` routes. A target containing `?` must
    /// match the request exactly; otherwise only the path is compared.
    pub async fn start(routes: Vec<(&str, u16, String)>) -> Self {
        let routes: Routes = Arc::new(
            routes
                .into_iter()
                .map(|(target, status, body)| (target.to_string(), (status, body)))
                .collect(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, routes).await;
                });
            }
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(mut stream: TcpStream, routes: Routes) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let path = target.split('?').next().unwrap_or("/");

    let (status, body) = routes
        .get(&target)
        .or_else(|| routes.get(path))
        .cloned()
        .unwrap_or((404, "not found".to_string()));

    let content_type = if body.trim_start().starts_with('<') {
        "text/html; charset=utf-8"
    } else {
        "application/json"
    };
    let response = format!(
        "HTTP/1.1 {status} STUB\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Product store backed by a file in a temporary directory
pub struct TestDatabase {
    pub store: ProductStore,
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("catalog.db").display());
        let connection = DatabaseConnection::new(&url).await.unwrap();
        let pool = connection.pool().clone();
        let store = ProductStore::new(pool.clone()).await.unwrap();
        Self { store, pool, _dir: dir }
    }
}
