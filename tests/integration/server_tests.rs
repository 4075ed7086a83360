//! End-to-end tests over real named pipes

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;

use booklend::{
    client::{self, Requester},
    config::{AppConfig, ClientConfig, ReplyConfig},
    models::Operation,
    server::{Server, ServerOptions, ServerSummary},
    AppResult,
};

const CATALOG: &str = "\
Intro to OS,100,1
1,D,01-03-2025
Compilers,200,2
1,P,28-03-2025
2,D,01-03-2025
";

struct Fixture {
    dir: tempfile::TempDir,
    config: AppConfig,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("catalog.txt"), CATALOG).unwrap();
        let config = AppConfig {
            reply: ReplyConfig {
                directory: dir.path().to_path_buf(),
                attempts: 5,
                retry_delay_ms: 20,
            },
            client: ClientConfig {
                reply_polls: 20,
                poll_interval_ms: 100,
            },
            ..AppConfig::default()
        };
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn options(&self) -> ServerOptions {
        ServerOptions {
            inbound: self.path("inbound"),
            catalog: self.path("catalog.txt"),
            save_to: Some(self.path("saved.txt")),
            verbose: true,
        }
    }

    fn start(&self) -> (mpsc::Sender<String>, tokio::task::JoinHandle<AppResult<ServerSummary>>) {
        let (tx, rx) = mpsc::channel(4);
        let server = Server::new(self.config.clone(), self.options());
        let handle = tokio::spawn(server.run(rx, tokio::io::sink()));
        (tx, handle)
    }

    async fn connect(&self, id: u32) -> Requester {
        for _ in 0..50 {
            if let Ok(requester) = Requester::connect_as(
                id,
                &self.path("inbound"),
                self.dir.path(),
                self.config.client.clone(),
            )
            .await
            {
                return requester;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server never opened its inbound pipe");
    }
}

async fn finish(handle: tokio::task::JoinHandle<AppResult<ServerSummary>>) -> ServerSummary {
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loan_return_and_quit_over_pipes() {
    let fixture = Fixture::new();
    let (_console, handle) = fixture.start();
    let mut requester = fixture.connect(4242).await;

    let reply = requester.request(Operation::Loan, "Intro to OS", 100).await.unwrap();
    assert!(reply.unwrap().starts_with("Loan granted: ISBN 100, copy 1, due "));

    let reply = requester.request(Operation::Loan, "Intro to OS", 100).await.unwrap();
    assert_eq!(reply.as_deref(), Some("Error: no copy available for ISBN 100"));

    let reply = requester.request(Operation::Return, "Compilers", 200).await.unwrap();
    assert_eq!(reply.as_deref(), Some("Return accepted: ISBN 200, copy 1"));

    requester.quit().await.unwrap();
    let summary = finish(handle).await;
    assert_eq!(summary.ingress.loans, 1);
    assert_eq!(summary.settled, 1);

    let saved = std::fs::read_to_string(fixture.path("saved.txt")).unwrap();
    let lines: Vec<&str> = saved.lines().collect();
    assert_eq!(lines[0], "Intro to OS,100,1");
    assert!(lines[1].starts_with("1,P,"));
    assert_eq!(lines[3], "1,D,28-03-2025");
    assert!(!fixture.path("inbound").exists());

    drop(requester);
    assert!(!fixture.path("pipe_4242").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_file_client() {
    let fixture = Fixture::new();
    let (_console, handle) = fixture.start();
    let mut requester = fixture.connect(4343).await;

    let batch: &[u8] = b"R, Compilers, 200\nnot a request\n\nP, Compilers, 200\nQ, quit, 0\nP, Compilers, 200\n";
    let mut out = Vec::new();
    let summary = client::run_batch(&mut requester, batch, &mut out).await.unwrap();
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.answered, 2);
    assert_eq!(summary.skipped, 1);
    assert!(summary.quit_sent);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Renewal accepted: ISBN 200, copy 1, due 05-04-2025"));
    assert!(text.contains("Loan granted: ISBN 200, copy 2"));

    finish(handle).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_console_quit_stops_server() {
    let fixture = Fixture::new();
    let (console, handle) = fixture.start();
    let _requester = fixture.connect(4444).await;

    console.send("r".to_string()).await.unwrap();
    console.send("s".to_string()).await.unwrap();

    let summary = finish(handle).await;
    assert_eq!(summary.settled, 0);
    assert!(fixture.path("saved.txt").exists());
}

#[tokio::test]
async fn test_missing_catalog_is_fatal() {
    let fixture = Fixture::new();
    let options = ServerOptions {
        catalog: fixture.path("nope.txt"),
        ..fixture.options()
    };
    let (_tx, rx) = mpsc::channel(1);

    let result = Server::new(fixture.config.clone(), options)
        .run(rx, tokio::io::sink())
        .await;
    assert!(result.is_err());
    assert!(!Path::new(&fixture.path("inbound")).exists());
}
