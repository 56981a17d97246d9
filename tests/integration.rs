use std::fs;
use std::net::SocketAddr;

use boutique::client::Client;
use boutique::codec::DEFAULT_MAX_MESSAGE_SIZE;
use boutique::handlers::Opcode;
use boutique::server::serve;
use boutique::store::{Store, Table, IMAGE_DIR};
use boutique::Error;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

const STITCHED: &str = "5 Maxi_Dress 49.99 red silk Gul S M L 39.99 floral lace slim full";
const CUSTOMER: &str = "1 Ayesha_Khan 29 0300-1234567 Mall_Road Lahore Punjab Pakistan";

struct TestServer {
    addr: SocketAddr,
    dir: TempDir,
    store: Store,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), Error>>,
}

impl TestServer {
    async fn start() -> TestServer {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            store.clone(),
            DEFAULT_MAX_MESSAGE_SIZE,
            rx,
        ));

        TestServer {
            addr,
            dir,
            store,
            shutdown,
            handle,
        }
    }

    async fn client(&self) -> Client {
        Client::connect(self.addr).await.unwrap()
    }

    fn lines(&self, table: Table) -> usize {
        self.store.lock().count_non_empty_lines(table).unwrap()
    }
}

#[tokio::test]
async fn add_then_search_returns_normalized_line() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let res = client
        .request(
            Opcode::AddUnstitched,
            "8 Lawn_Suit 20 blue lawn Khaadi S M L 18 44in fast straight 3m",
        )
        .await
        .unwrap();
    assert_eq!(
        res,
        "SUCCESS: Unstitched dress added successfully (ID: 8)"
    );

    let res = client.request(Opcode::SearchUnstitched, "8").await.unwrap();
    assert_eq!(
        res,
        "FOUND: 8 Lawn_Suit 20.00 blue lawn Khaadi S M L 18.00 44in fast straight 3m"
    );
}

#[tokio::test]
async fn duplicate_add_appends_nothing() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.request(Opcode::AddCustomer, CUSTOMER).await.unwrap();
    let res = client.request(Opcode::AddCustomer, CUSTOMER).await.unwrap();

    assert!(res.starts_with("ERROR:"), "{}", res);
    assert!(res.contains("Duplicate"), "{}", res);
    assert_eq!(server.lines(Table::Customers), 1);
}

#[tokio::test]
async fn count_matches_successful_adds() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    for id in 1..=4 {
        let payload = format!("{} Maxi 10 red silk Gul S M L 9 floral lace slim full", id);
        let res = client.request(Opcode::AddStitched, &payload).await.unwrap();
        assert!(res.starts_with("SUCCESS:"), "{}", res);
    }

    // A rejected add does not count.
    client
        .request(Opcode::AddStitched, "2 Maxi 10 red silk Gul S M L 9 floral lace slim full")
        .await
        .unwrap();
    client.request(Opcode::ViewStitched, "").await.unwrap();
    client.request(Opcode::SearchStitched, "3").await.unwrap();

    let res = client.request(Opcode::CountStitched, "").await.unwrap();
    assert_eq!(res, "Total Stitched Dresses: 4");

    let res = client.request(Opcode::CountUnstitched, "").await.unwrap();
    assert_eq!(res, "Total Unstitched Dresses: 0");
}

#[tokio::test]
async fn view_listing() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let res = client.request(Opcode::ViewCustomers, "").await.unwrap();
    assert_eq!(res, "No CUSTOMERS found");

    client.request(Opcode::AddCustomer, CUSTOMER).await.unwrap();
    let res = client.request(Opcode::ViewCustomers, "").await.unwrap();
    assert_eq!(
        res,
        format!(
            "\n========== CUSTOMERS ==========\n1. {}\n================================\n",
            CUSTOMER
        )
    );
}

#[tokio::test]
async fn process_order() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.request(Opcode::AddCustomer, CUSTOMER).await.unwrap();
    client.request(Opcode::AddStitched, STITCHED).await.unwrap();

    let res = client
        .request(Opcode::ProcessOrder, "10 1 5 S 3")
        .await
        .unwrap();
    assert_eq!(res, "SUCCESS: Successfully processed order (Total: $149.97)");

    let res = client.request(Opcode::SearchOrder, "10").await.unwrap();
    assert_eq!(res, "FOUND: 10 1 5 S 3 149.97");
}

#[tokio::test]
async fn order_for_unknown_customer_appends_nothing() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.request(Opcode::AddStitched, STITCHED).await.unwrap();

    let res = client
        .request(Opcode::ProcessOrder, "10 42 5 S 3")
        .await
        .unwrap();
    assert_eq!(res, "ERROR: Customer ID 42 not found");

    let res = client
        .request(Opcode::ProcessOrder, "10 42 5 U 3")
        .await
        .unwrap();
    assert_eq!(res, "ERROR: Customer ID 42 not found");

    assert_eq!(server.lines(Table::Orders), 0);
}

#[tokio::test]
async fn order_for_dress_in_other_file() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.request(Opcode::AddCustomer, CUSTOMER).await.unwrap();
    client.request(Opcode::AddStitched, STITCHED).await.unwrap();

    let res = client
        .request(Opcode::ProcessOrder, "10 1 5 U 3")
        .await
        .unwrap();

    assert_eq!(res, "ERROR: Dress ID 5 not found in unstitched_dresses.txt");
    assert_eq!(server.lines(Table::Orders), 0);
}

#[tokio::test]
async fn concurrent_adds_of_same_id() {
    let server = TestServer::start().await;

    for id in 1..=20 {
        let payload = format!("{} Jane 30 0300 Street City State Country", id);
        let mut first = server.client().await;
        let mut second = server.client().await;

        let (a, b) = tokio::join!(
            first.request(Opcode::AddCustomer, &payload),
            second.request(Opcode::AddCustomer, &payload),
        );
        let replies = [a.unwrap(), b.unwrap()];

        let successes = replies.iter().filter(|r| r.starts_with("SUCCESS:")).count();
        let duplicates = replies.iter().filter(|r| r.contains("Duplicate")).count();

        assert_eq!(successes, 1, "{:?}", replies);
        assert_eq!(duplicates, 1, "{:?}", replies);
    }

    assert_eq!(server.lines(Table::Customers), 20);
}

#[tokio::test]
async fn waiting_on_the_store_does_not_stall_other_connections() {
    let server = TestServer::start().await;
    let mut blocked = server.client().await;
    let mut other = server.client().await;

    let guard = server.store.lock();
    let pending =
        tokio::spawn(async move { blocked.request(Opcode::AddCustomer, CUSTOMER).await });

    let res = timeout(
        Duration::from_secs(5),
        other.request(Opcode::UppercaseText, "still serving"),
    )
    .await
    .expect("server stalled while the store was locked")
    .unwrap();
    assert_eq!(res, "SUCCESS: STILL SERVING");
    assert!(!pending.is_finished());

    drop(guard);
    let res = pending.await.unwrap().unwrap();
    assert_eq!(res, "SUCCESS: Customer added successfully (ID: 1)");
}

#[tokio::test]
async fn send_image() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    let data: Vec<u8> = (0..=255).chain(0..16).map(|b| b as u8).collect();

    let res = client.send_image("dress.bin", &data).await.unwrap();
    assert_eq!(res, "SUCCESS: Image dress.bin received");

    let saved = fs::read(server.dir.path().join(IMAGE_DIR).join("dress.bin")).unwrap();
    assert_eq!(saved, data);

    // Same name overwrites.
    client.send_image("dress.bin", &[0, 0, 0]).await.unwrap();
    let saved = fs::read(server.dir.path().join(IMAGE_DIR).join("dress.bin")).unwrap();
    assert_eq!(saved, vec![0, 0, 0]);
}

#[tokio::test]
async fn send_large_image() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    // Encodes to 12000 base64 characters, sent as a single write.
    let data: Vec<u8> = (0..9000u32).map(|i| (i % 251) as u8).collect();

    let res = client.send_image("large.png", &data).await.unwrap();
    assert_eq!(res, "SUCCESS: Image large.png received");

    let saved = fs::read(server.dir.path().join(IMAGE_DIR).join("large.png")).unwrap();
    assert_eq!(saved, data);

    // The connection stays in step after the large message.
    let res = client.request(Opcode::UppercaseText, "next").await.unwrap();
    assert_eq!(res, "SUCCESS: NEXT");
}

#[tokio::test]
async fn many_requests_on_one_connection() {
    let server = TestServer::start().await;
    let mut client = server.client().await;
    let text = "x".repeat(100);

    for i in 0..400 {
        let res = client
            .request(Opcode::UppercaseText, &format!("{} {}", i, text))
            .await
            .unwrap();

        assert_eq!(
            res,
            format!("SUCCESS: {} {}", i, text.to_ascii_uppercase()),
            "request {}",
            i
        );
    }
}

#[tokio::test]
async fn uppercase() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let res = client
        .request(Opcode::UppercaseText, "hello world")
        .await
        .unwrap();

    assert_eq!(res, "SUCCESS: HELLO WORLD");
}

#[tokio::test]
async fn malformed_requests_keep_connection_open() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let res = client.send_raw(b"hello").await.unwrap();
    assert_eq!(res, "ERROR: Invalid message format. Expected: MessageType|Data");

    let res = client.send_raw(b"abc|hello").await.unwrap();
    assert_eq!(res, "ERROR: Invalid message type (abc)");

    let res = client.send_raw(b"99|hello").await.unwrap();
    assert_eq!(res, "ERROR: Unknown request type (99)");

    let res = client
        .request(Opcode::AddStitched, "5 Maxi not-a-price")
        .await
        .unwrap();
    assert_eq!(res, "ERROR: Invalid stitched dress data format");

    let res = client.send_raw(b"20|still here").await.unwrap();
    assert_eq!(res, "SUCCESS: STILL HERE");
}

#[tokio::test]
async fn shutdown_closes_open_connections() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    client.request(Opcode::UppercaseText, "ping").await.unwrap();

    server.shutdown.send(()).unwrap();
    let res = timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(res.is_ok());

    assert!(client.request(Opcode::UppercaseText, "ping").await.is_err());
}
