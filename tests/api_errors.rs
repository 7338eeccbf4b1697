use cvtrends_rs::Client;
use cvtrends_rs::api::{embedded_error, status_fallback_message};
use cvtrends_rs::models::AnalysisReport;
use reqwest::StatusCode;
use serde_json::json;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Minimal HTTP stub: serves the same canned response to every connection
/// and counts how many requests arrive. `Connection: close` in the response
/// keeps one connection per request.
fn stub_server(response: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (base_url, hits)
}

/// Read a full request (headers plus Content-Length body) before replying,
/// so the client never sees its write cut short.
fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk) else { return };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                return;
            }
        }
    }
}

#[test]
fn message_precedence_is_detail_then_error_then_status() {
    let both = json!({"detail": "db unavailable", "error": "boom"});
    assert_eq!(embedded_error(&both).as_deref(), Some("db unavailable"));

    let error_only = json!({"error": "boom"});
    assert_eq!(embedded_error(&error_only).as_deref(), Some("boom"));

    let clean = json!({"skills": [], "levels": []});
    assert_eq!(embedded_error(&clean), None);
    assert_eq!(
        status_fallback_message(StatusCode::INTERNAL_SERVER_ERROR),
        "server error: 500"
    );
}

#[test]
fn a_2xx_body_with_an_error_field_is_still_a_failure() {
    // The service reports some failures inside an otherwise-OK body.
    let body = json!({
        "skills": [["Python", 1, 2]],
        "detail": "index rebuild in progress"
    });
    assert_eq!(
        embedded_error(&body).as_deref(),
        Some("index rebuild in progress")
    );
}

#[test]
fn non_string_error_fields_do_not_trip_detection() {
    assert_eq!(embedded_error(&json!({"detail": {"code": 3}})), None);
    assert_eq!(embedded_error(&json!({"error": ["a", "b"]})), None);
    assert_eq!(embedded_error(&json!(["detail"])), None);
}

#[test]
fn a_plain_text_error_body_falls_back_to_the_status_message() {
    let (base_url, _) = stub_server(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 9\r\n\
         Connection: close\r\n\r\n\
         not found",
    );
    let err = Client::new(base_url).fetch_market_trends().unwrap_err();
    assert_eq!(err.to_string(), "server error: 404");
}

#[test]
fn analyze_cv_reports_the_status_for_non_json_error_bodies() {
    let (base_url, _) = stub_server(
        "HTTP/1.1 400 Bad Request\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 9\r\n\
         Connection: close\r\n\r\n\
         bad input",
    );
    let err = Client::new(base_url).analyze_cv("some cv text").unwrap_err();
    assert_eq!(err.to_string(), "server error: 400");
}

#[test]
fn a_json_error_body_still_wins_over_the_status_fallback() {
    let (base_url, _) = stub_server(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 26\r\n\
         Connection: close\r\n\r\n\
         {\"detail\":\"no such route\"}",
    );
    let err = Client::new(base_url).fetch_market_trends().unwrap_err();
    assert_eq!(err.to_string(), "no such route");
}

#[test]
fn server_errors_are_retried_on_schedule_then_reported() {
    let (base_url, hits) = stub_server(
        "HTTP/1.1 500 Internal Server Error\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 4\r\n\
         Connection: close\r\n\r\n\
         oops",
    );
    let err = Client::new(base_url).fetch_market_trends().unwrap_err();
    assert_eq!(err.to_string(), "server error: 500");
    // One initial attempt plus one retry per backoff step.
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[test]
fn analysis_report_parses_the_full_service_shape() {
    let report: AnalysisReport = serde_json::from_value(json!({
        "recommendation": {
            "opening": "Strong backend profile.",
            "cv_review_title": "CV review",
            "cv_review_points": ["Lead with impact", "Quantify results"],
            "gap_analysis_intro": "A few market gaps stand out.",
            "closing": "Good luck!"
        },
        "analysis_details": {
            "cv_skills": ["Python", "SQL"],
            "market_gaps": ["Docker"]
        },
        "top_jobs": [{
            "title": "Backend Developer",
            "company": "Acme",
            "level": "Senior",
            "link": "https://example.com/jobs/1",
            "match_percentage": 87.5
        }]
    }))
    .unwrap();

    assert_eq!(report.recommendation.cv_review_points.len(), 2);
    assert_eq!(report.analysis_details.market_gaps, ["Docker"]);
    assert_eq!(report.top_jobs[0].company, "Acme");
    assert_eq!(report.top_jobs[0].match_percentage, Some(87.5));
}

#[test]
fn analysis_report_tolerates_sparse_responses() {
    // The upstream service is opaque; partial answers must still parse.
    let report: AnalysisReport = serde_json::from_value(json!({
        "recommendation": {"opening": "Hi"},
        "top_jobs": [{"title": "Dev"}]
    }))
    .unwrap();
    assert_eq!(report.recommendation.opening, "Hi");
    assert!(report.recommendation.cv_review_points.is_empty());
    assert!(report.analysis_details.cv_skills.is_empty());
    assert_eq!(report.top_jobs[0].match_percentage, None);

    let empty: AnalysisReport = serde_json::from_str("{}").unwrap();
    assert!(empty.top_jobs.is_empty());
}
