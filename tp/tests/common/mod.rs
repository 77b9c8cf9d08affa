//! Shared helpers for integration tests
//!
//! `ScriptedServer` is a minimal HTTP/1.1 backend: it answers each
//! connection with the next scripted response and records what it received.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by the fake backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub api_key: Option<String>,
    /// Parsed JSON body, `Value::Null` when empty
    pub body: Value,
}

pub struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedServer {
    /// Serve `responses` in order, one per connection; 404 once they run out
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Mutex::new(VecDeque::from(responses)));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let next = script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));
                let recorded = recorded.clone();
                tokio::spawn(handle(stream, next, recorded));
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(mut stream: TcpStream, (status, body): (u16, String), recorded: Arc<Mutex<Vec<RecordedRequest>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut api_key = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match name.as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "x-api-key" => api_key = Some(value),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let body_bytes = &buf[header_end..(header_end + content_length).min(buf.len())];
    let request_body = serde_json::from_slice(body_bytes).unwrap_or(Value::Null);

    // Record before answering so the client never observes a response first
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        api_key,
        body: request_body,
    });

    let response = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

// =============================================================================
// Response bodies
// =============================================================================

pub fn destinations_body(count: usize) -> String {
    let cities = ["Lisbon", "Porto", "Madeira", "Faro", "Coimbra"];
    let recommendations: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("dest_{:03}", i + 1),
                "name": format!("{}, Portugal", cities[i % cities.len()]),
                "country": "Portugal",
                "match_score": 95 - i as u32,
                "estimated_cost": 1400 + 100 * i as i64,
                "highlights": ["Food", "Coast"],
                "why_recommended": "Matches your love of food",
            })
        })
        .collect();
    json!({ "recommendations": recommendations }).to_string()
}

pub fn activities_body(questionnaire_id: &str, ids: &[&str]) -> String {
    let activities: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Activity {}", id),
                "category": "cultural",
                "duration_hours": 2,
                "cost": 20.0,
                "priority": "medium",
                "description": "A good time",
            })
        })
        .collect();
    json!({
        "questionnaire_id": questionnaire_id,
        "destination": { "id": "dest_001", "name": "Lisbon, Portugal" },
        "suggested_activities": activities,
        "ready_for_optimization": true,
    })
    .to_string()
}

pub fn itinerary_body() -> String {
    json!({
        "itinerary": {
            "destination": "Lisbon, Portugal",
            "total_days": 2,
            "daily_schedules": [
                {
                    "date": "2099-06-01",
                    "day_number": 1,
                    "theme": "Old town",
                    "activities": [
                        {
                            "start_time": "09:00",
                            "end_time": "11:00",
                            "activity": { "name": "Tram 28", "type": "sightseeing", "notes": "Go early" }
                        }
                    ],
                    "daily_cost": 45.5,
                    "walking_distance": "6 km"
                }
            ]
        },
        "summary": { "total_cost": 120.0, "total_activities": 3, "optimization_score": 0.87 }
    })
    .to_string()
}
