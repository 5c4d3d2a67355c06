//! Talks to a fake planning API served on a local port

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use aoi_planner::client::{ApiError, Client};
use aoi_planner::records::{NewDelivery, NewField};
use aoi_planner::task::TaskStatus;
use aoi_planner::traits::ScheduleSource;
use aoi_planner::{CalendarController, CalendarViewModel, MonthView};

/// A canned answer of the fake server
struct Answer {
    status: &'static str,
    /// Extra header lines, each ending with `\r\n`
    headers: &'static str,
    body: &'static str,
}

impl Answer {
    fn json(status: &'static str, body: &'static str) -> Self {
        Self { status, headers: "", body }
    }
}

/// What the fake server received
struct Received {
    head: String,
    body: String,
}

impl Received {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }
}

/// Serve one connection per answer, in order, and report every request received
async fn serve(answers: Vec<Answer>) -> (String, mpsc::UnboundedReceiver<Received>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (sender, receiver) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for answer in answers {
            let (mut socket, _) = listener.accept().await.unwrap();
            let received = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
                answer.status, answer.body.len(), answer.headers, answer.body);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = sender.send(received);
        }
    });

    (format!("http://{}/api", address), receiver)
}

async fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::UnboundedReceiver<Received>) {
    serve(vec![Answer::json(status, body)]).await
}

async fn read_request(socket: &mut TcpStream) -> Received {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the end of the headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let received = Received { head, body: String::new() };

    let chunked = received.header("transfer-encoding").map(|v| v.eq_ignore_ascii_case("chunked")).unwrap_or(false);
    let content_length = received.header("content-length").and_then(|v| v.parse::<usize>().ok()).unwrap_or(0);
    loop {
        let complete = if chunked {
            buf.ends_with(b"0\r\n\r\n")
        } else {
            buf.len() >= header_end + content_length
        };
        if complete {
            break;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the end of the body");
        buf.extend_from_slice(&chunk[..n]);
    }

    Received { body: String::from_utf8_lossy(&buf[header_end..]).to_string(), ..received }
}


#[tokio::test]
async fn test_get_schedule() {
    let (url, mut received) = serve_once("200 OK", r#"[
        {"task_id": 9, "field_id": 3, "date": "2024-03-05T00:00:00Z", "type": "irrigation", "title": "Water", "qty": 20, "unit": "mm", "status": "todo"},
        {"task_id": 10, "date": "2024-03-06", "type": "observe", "title": "Look", "notes": "", "status": "skipped"}
    ]"#).await;
    let client = Client::new(&url).unwrap();

    let tasks = client.get_schedule(3, "2024-03-01", "2024-03-31").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].day_key(), "2024-03-05");
    assert_eq!(tasks[0].qty(), Some(20.0));
    assert_eq!(tasks[1].status(), TaskStatus::Skipped);
    assert_eq!(tasks[1].notes(), None);

    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "GET /api/fields/3/schedule?from=2024-03-01&to=2024-03-31 HTTP/1.1");
}

#[tokio::test]
async fn test_schedule_source_runs_on_any_thread() {
    let (url, _received) = serve_once("200 OK", r#"[{"task_id": 1, "date": "2024-03-05", "type": "pest", "title": "Spray"}]"#).await;
    let client = Client::new(&url).unwrap();

    // spawning requires the trait futures to be `Send`
    let fetched = tokio::spawn(async move {
        ScheduleSource::get_schedule(&client, 3, "2024-03-01", "2024-03-31").await
            .map(|tasks| tasks.len())
            .map_err(|err| err.to_string())
    }).await.unwrap();
    assert_eq!(fetched, Ok(1));
}

#[tokio::test]
async fn test_null_schedule_is_empty() {
    let (url, _received) = serve_once("200 OK", "null").await;
    let client = Client::new(&url).unwrap();
    let tasks = client.get_schedule(3, "2024-03-01", "2024-03-31").await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_patch_task_status() {
    let (url, mut received) = serve_once("200 OK", r#"{"ok": true}"#).await;
    let client = Client::new(&url).unwrap();
    client.patch_task_status(9, TaskStatus::Done).await.unwrap();

    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "PATCH /api/schedule/9 HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(body, serde_json::json!({"status": "done"}));
}

#[tokio::test]
async fn test_error_statuses() {
    let (url, _received) = serve_once("409 Conflict", r#"{"error": "task is locked"}"#).await;
    let client = Client::new(&url).unwrap();

    let err = client.patch_task_status(9, TaskStatus::Done).await.unwrap_err();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status(), 409);
    assert_eq!(api_error.message(), "task is locked");
    assert_eq!(err.to_string(), "Unexpected HTTP status code 409: task is locked");
}

#[tokio::test]
async fn test_generate_plan() {
    let (url, mut received) = serve_once("201 Created", r#"{
        "field_id": 7, "plan_id": 2, "version": 1,
        "calendar": {
            "2024-08-20": [{"task_id": 3, "type": "fertilizer", "title": "Top dressing", "qty": 25, "unit": "kg", "status": "todo"}],
            "2024-08-12": [{"task_id": 1, "type": "irrigation", "title": "Water", "status": "todo"},
                           {"task_id": 2, "type": "observe", "title": "Look", "status": "done"}]
        }
    }"#).await;
    let client = Client::new(&url).unwrap();

    let plan = client.generate_plan(7).await.unwrap();
    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "POST /api/fields/7/plan?format=calendar HTTP/1.1");

    let mut calendar = CalendarController::new(client, CalendarViewModel::new(MonthView::new(2024, 2).unwrap()));
    calendar.apply_plan(plan);
    assert_eq!(calendar.field_id(), Some(7));
    assert_eq!(calendar.view_model().month_label(), "2024-08");
    assert_eq!(calendar.view_model().selection(), Some("2024-08-12"));
    assert_eq!(calendar.view_model().index().tasks_on("2024-08-12").len(), 2);
    assert_eq!(calendar.view_model().last_plan_date(), Some("2024-08-20"));
}

#[tokio::test]
async fn test_dev_login_keeps_the_session() {
    let (url, mut received) = serve(vec![
        Answer { status: "200 OK", headers: "Set-Cookie: session=s3cr3t; Path=/\r\n", body: r#"{"ok": true}"# },
        Answer::json("200 OK", r#"{"uid": "U_TEST", "role": "farmer"}"#),
    ]).await;
    let client = Client::new(&url).unwrap();

    let who = client.dev_login("U_TEST").await.unwrap();
    assert_eq!(who["uid"], "U_TEST");

    let login = received.recv().await.unwrap();
    assert_eq!(login.request_line(), "GET /api/devlogin?uid=U_TEST HTTP/1.1");
    let whoami = received.recv().await.unwrap();
    assert_eq!(whoami.request_line(), "GET /api/whoami HTTP/1.1");
    assert_eq!(whoami.header("cookie"), Some("session=s3cr3t"));
}

#[tokio::test]
async fn test_kb_search_encodes_the_query() {
    let (url, mut received) = serve_once("200 OK", r#"{"results": []}"#).await;
    let client = Client::new(&url).unwrap();

    let found = client.kb_search("rice blast & fungus").await.unwrap();
    assert_eq!(found, serde_json::json!({"results": []}));
    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "GET /api/kb/search?q=rice+blast+%26+fungus HTTP/1.1");
}

#[tokio::test]
async fn test_rai_analyze() {
    let (url, mut received) = serve_once("200 OK", r#"{
        "title": "Field 7",
        "summary": "Water stress expected",
        "bullets": ["Irrigate twice"],
        "metrics": [{"name": "Yield", "value": 12.5, "unit": "t/rai"}],
        "chart": {"labels": ["water", "fertilizer"], "series": [3, 1]}
    }"#).await;
    let client = Client::new(&url).unwrap();

    let form = vec![
        ("province".to_string(), "Khon Kaen".to_string()),
        ("area_rai".to_string(), "12".to_string()),
    ];
    let infographic = client.rai_analyze(&form).await.unwrap();
    assert_eq!(infographic.title(), "Field 7");
    assert_eq!(infographic.metrics[0].name, "Yield");
    assert_eq!(infographic.chart_shares()[0], ("water".to_string(), 75.0));

    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "POST /api/api/rai/analyze HTTP/1.1");
    assert!(received.header("content-type").unwrap().starts_with("multipart/form-data; boundary="));
    assert!(received.body.contains("name=\"province\"\r\n\r\nKhon Kaen\r\n"));
    assert!(received.body.contains("name=\"area_rai\"\r\n\r\n12\r\n"));
}

#[tokio::test]
async fn test_create_field() {
    let (url, mut received) = serve_once("201 Created", r#"{"field_id": 7, "variety": "KK3", "area_rai": 12.5}"#).await;
    let client = Client::new(&url).unwrap();

    let field = NewField {
        variety: "KK3".to_string(),
        crop_type: "new_plant".to_string(),
        area_rai: 12.5,
        planting_date: "2024-03-01".to_string(),
        ..NewField::default()
    };
    let created = client.create_field(&field).await.unwrap();
    assert_eq!(created.field_id, 7);
    assert_eq!(created.attributes["variety"], "KK3");

    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "POST /api/fields HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(body["area_rai"], 12.5);
    assert!(body.get("pump_m3h").is_none());
}

#[tokio::test]
async fn test_create_delivery_without_time_window() {
    let (url, mut received) = serve_once("201 Created", r#"{"delivery_id": 5}"#).await;
    let client = Client::new(&url).unwrap();

    let delivery = NewDelivery {
        date: "2024-12-20".to_string(),
        mill_name: "Mitr Phol".to_string(),
        mill_quota_ton: 80.0,
        ..NewDelivery::default()
    };
    let answer = client.create_delivery(7, &delivery).await.unwrap();
    assert_eq!(answer["delivery_id"], 5);

    let received = received.recv().await.unwrap();
    assert_eq!(received.request_line(), "POST /api/fields/7/deliveries HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(body["time_window_from"], serde_json::Value::Null);
    assert_eq!(body["time_window_to"], serde_json::Value::Null);
    assert_eq!(body["mill_quota_ton"], 80.0);
}
