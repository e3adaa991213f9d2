use once_cell::sync::Lazy;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Topic {
    id: String,
    name: String,
    unit: String,
    data: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    date: String,
    value: f64,
    level: u8,
}

#[derive(Debug, Deserialize)]
struct Stats {
    total_all_time: f64,
    total_this_week: f64,
    today_value: f64,
    current_streak: u32,
}

#[derive(Debug, Deserialize)]
struct HeatmapView {
    max_value: f64,
    stats: Stats,
    cells: Option<Vec<Cell>>,
    years: Option<Vec<Value>>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("heatmap_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/topics")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_heatmap_tracker"))
        .env("HOST", "127.0.0.1")
        .env("PORT", port.to_string())
        .env("HEATMAP_DATA_PATH", unique_data_path())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_topic(client: &Client, base_url: &str, name: &str, unit: &str) -> Topic {
    let response = client
        .post(format!("{base_url}/api/topics"))
        .json(&json!({ "name": name, "unit": unit }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn set_entry(client: &Client, base_url: &str, id: &str, date: &str, value: f64) -> Topic {
    let response = client
        .put(format!("{base_url}/api/topics/{id}/entries/{date}"))
        .json(&json!({ "value": value }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn export(client: &Client, base_url: &str) -> Vec<Topic> {
    client
        .get(format!("{base_url}/api/export"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_heatmap_reports_stats_for_entries() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Coding", "hours").await;
    set_entry(&client, base, &topic.id, "2024-01-10", 5.0).await;
    set_entry(&client, base, &topic.id, "2024-01-09", 3.0).await;
    set_entry(&client, base, &topic.id, "2024-01-07", 2.0).await;
    set_entry(&client, base, &topic.id, "2024-01-03", 100.0).await;

    let view: HeatmapView = client
        .get(format!("{base}/api/topics/{}/heatmap?today=2024-01-10", topic.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view.stats.current_streak, 2);
    assert_eq!(view.stats.today_value, 5.0);
    assert_eq!(view.stats.total_this_week, 10.0);
    assert_eq!(view.stats.total_all_time, 110.0);
    assert_eq!(view.max_value, 100.0);
    assert!(view.years.is_none());

    let cells = view.cells.expect("strip layout returns cells");
    assert_eq!(cells.len(), 371);
    assert!(cells.iter().all(|cell| cell.level <= 5));
    let peak = cells.iter().find(|cell| cell.date == "2024-01-03").unwrap();
    assert_eq!(peak.value, 100.0);
    assert_eq!(peak.level, 5);
}

#[tokio::test]
async fn http_month_layout_lists_years() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Reading", "pages").await;
    set_entry(&client, base, &topic.id, "2022-05-01", 20.0).await;

    let view: HeatmapView = client
        .get(format!("{base}/api/topics/{}/heatmap?layout=months&today=2024-01-10", topic.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(view.cells.is_none());
    let years = view.years.expect("month layout returns years");
    let listed: Vec<i64> = years.iter().map(|year| year["year"].as_i64().unwrap()).collect();
    assert_eq!(listed, vec![2022, 2024]);
}

#[tokio::test]
async fn http_zero_value_removes_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Exercise", "minutes").await;
    let with_entry = set_entry(&client, base, &topic.id, "2024-02-01", 30.0).await;
    assert_eq!(with_entry.data.get("2024-02-01"), Some(&30.0));

    let cleared = set_entry(&client, base, &topic.id, "2024-02-01", 0.0).await;
    assert!(cleared.data.is_empty());

    let patched: Topic = client
        .patch(format!("{base}/api/topics/{}", topic.id))
        .json(&json!({ "data": { "2024-02-02": 4, "2024-02-03": 0 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(patched.data.len(), 1);
    assert_eq!(patched.name, "Exercise");
}

#[tokio::test]
async fn http_rejects_bad_requests() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let missing = client
        .get(format!("{base}/api/topics/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let blank = client
        .post(format!("{base}/api/topics"))
        .json(&json!({ "name": "  ", "unit": "hours" }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let topic = create_topic(&client, base, "Water", "glasses").await;
    let bad_date = client
        .put(format!("{base}/api/topics/{}/entries/2024-02-30", topic.id))
        .json(&json!({ "value": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);

    let deleted = client
        .delete(format!("{base}/api/topics/{}", topic.id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let again = client
        .delete(format!("{base}/api/topics/{}", topic.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_import_replaces_store_and_rejects_invalid_payloads() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Guitar", "minutes").await;
    set_entry(&client, base, &topic.id, "2024-03-01", 45.0).await;
    let before = export(&client, base).await;

    let invalid = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(br#"{"not": "an array"}"#.to_vec()).file_name("bad.json"),
    );
    let rejected = client
        .post(format!("{base}/api/import"))
        .multipart(invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(export(&client, base).await, before);

    let replacement = json!([
        { "id": "imported-1", "name": "Running", "unit": "km", "data": { "2024-03-02": 5 } }
    ]);
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(serde_json::to_vec(&replacement).unwrap()).file_name("data.json"),
    );
    let imported = client
        .post(format!("{base}/api/import"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(imported.status().is_success());

    let after = export(&client, base).await;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, "imported-1");
    assert_eq!(after[0].data.get("2024-03-02"), Some(&5.0));

    let roundtrip = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(serde_json::to_vec(&before_as_json(&before)).unwrap())
            .file_name("roundtrip.json"),
    );
    let restored = client
        .post(format!("{base}/api/import"))
        .multipart(roundtrip)
        .send()
        .await
        .unwrap();
    assert!(restored.status().is_success());
    assert_eq!(export(&client, base).await, before);
}

fn before_as_json(topics: &[Topic]) -> Value {
    Value::Array(
        topics
            .iter()
            .map(|topic| {
                json!({
                    "id": topic.id,
                    "name": topic.name,
                    "unit": topic.unit,
                    "data": topic.data,
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn http_heatmap_query_errors_are_json() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Piano", "minutes").await;
    let heatmap = |query: &str| format!("{base}/api/topics/{}/heatmap?{query}", topic.id);

    let bad_layout = client.get(heatmap("layout=grid")).send().await.unwrap();
    assert_eq!(bad_layout.status(), StatusCode::BAD_REQUEST);
    let body: Value = bad_layout.json().await.unwrap();
    assert!(body["message"].is_string());

    for today in ["-262143-01-04", "%2B262142-12-31", "10000-01-01"] {
        let response = client.get(heatmap(&format!("today={today}"))).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "today={today}");
        let body: Value = response.json().await.unwrap();
        assert!(body["message"].as_str().unwrap().contains("invalid date"));
    }

    for today in ["0001-01-01", "9999-12-31"] {
        let view: HeatmapView = client
            .get(heatmap(&format!("today={today}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view.cells.unwrap().len(), 371);
    }
}

#[derive(Debug, Deserialize)]
struct Summary {
    id: String,
    name: String,
    stats: Stats,
}

#[tokio::test]
async fn http_summaries_report_week_totals() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let topic = create_topic(&client, base, "Cycling", "km").await;
    set_entry(&client, base, &topic.id, "2024-01-10", 5.0).await;
    set_entry(&client, base, &topic.id, "2024-01-04", 2.0).await;
    set_entry(&client, base, &topic.id, "2024-01-03", 100.0).await;

    let summaries: Vec<Summary> = client
        .get(format!("{base}/api/summaries?today=2024-01-10"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let summary = summaries.iter().find(|s| s.id == topic.id).unwrap();
    assert_eq!(summary.name, "Cycling");
    assert_eq!(summary.stats.total_this_week, 7.0);
    assert_eq!(summary.stats.total_all_time, 107.0);

    let bad = client
        .get(format!("{base}/api/summaries?today=2024-13-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
