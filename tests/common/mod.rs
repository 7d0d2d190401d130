//! Shared test fixtures for the covid-trends integration tests.
//!
//! Writes small CSSE-shaped CSV files into a temporary cache directory so an
//! offline SDK can be built without touching the network.

#![allow(dead_code)]

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use covid_trends::config;
use covid_trends::{CovidTrends, Metric};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

/// Number of date columns in the sample tables.
pub const SAMPLE_DAYS: usize = 45;

/// One CSV row: (province, country, cumulative values). Use `None` for a
/// blank cell.
pub type Row<'a> = (&'a str, &'a str, Vec<Option<f64>>);

/// Consecutive dates starting at the first CSSE date, 2020-01-22.
pub fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
    (0..n)
        .map(|i| start + ChronoDuration::days(i as i64))
        .collect()
}

/// `start, start + step, start + 2*step, ...` as a full row of values.
pub fn linear(n: usize, start: f64, step: f64) -> Vec<Option<f64>> {
    (0..n).map(|i| Some(start + step * i as f64)).collect()
}

/// Render rows in the CSSE layout with `M/D/YY` date headers.
pub fn csv_text(n_dates: usize, rows: &[Row<'_>]) -> String {
    let mut out = String::from("Province/State,Country/Region,Lat,Long");
    for d in dates(n_dates) {
        out.push_str(&format!(",{}/{}/{:02}", d.month(), d.day(), d.year() % 100));
    }
    out.push('\n');
    for (province, country, values) in rows {
        out.push_str(&format!("{},{},1.5,-2.5", quote(province), quote(country)));
        for v in values {
            out.push(',');
            if let Some(v) = v {
                out.push_str(&v.to_string());
            }
        }
        out.push('\n');
    }
    out
}

/// Write a CSV for `metric` into `dir` under its CSSE file name.
pub fn write_csv(dir: &Path, metric: Metric, n_dates: usize, rows: &[Row<'_>]) -> PathBuf {
    let path = dir.join(config::csv_file(metric));
    fs::write(&path, csv_text(n_dates, rows)).unwrap();
    path
}

/// The three sample tables as `(file name, CSV body)` pairs.
pub fn sample_bodies() -> Vec<(String, String)> {
    let dir = tempfile::tempdir().unwrap();
    write_sample_tables(dir.path());
    Metric::ALL
        .iter()
        .map(|&m| {
            let name = config::csv_file(m).to_string();
            let body = fs::read_to_string(dir.path().join(&name)).unwrap();
            (name, body)
        })
        .collect()
}

/// Write the three sample tables into `dir`.
///
/// - India: confirmed 100 + 10/day, deaths 1/day, recovered 50 + 5/day
/// - Canada: two provinces, each confirmed 5/day and deaths 1/day
/// - Atlantis: all zeros
pub fn write_sample_tables(dir: &Path) {
    let n = SAMPLE_DAYS;
    write_csv(
        dir,
        Metric::Confirmed,
        n,
        &[
            ("", "India", linear(n, 100.0, 10.0)),
            ("Ontario", "Canada", linear(n, 0.0, 5.0)),
            ("Quebec", "Canada", linear(n, 0.0, 5.0)),
            ("", "Atlantis", linear(n, 0.0, 0.0)),
        ],
    );
    write_csv(
        dir,
        Metric::Deaths,
        n,
        &[
            ("", "India", linear(n, 0.0, 1.0)),
            ("Ontario", "Canada", linear(n, 0.0, 1.0)),
            ("Quebec", "Canada", linear(n, 0.0, 1.0)),
            ("", "Atlantis", linear(n, 0.0, 0.0)),
        ],
    );
    write_csv(
        dir,
        Metric::Recovered,
        n,
        &[
            ("", "India", linear(n, 50.0, 5.0)),
            ("", "Canada", linear(n, 0.0, 0.0)),
            ("", "Atlantis", linear(n, 0.0, 0.0)),
        ],
    );
}

/// Build an offline SDK over the sample tables.
///
/// Returns `(CovidTrends, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_sample_sdk(warmup_offset: usize) -> (CovidTrends, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    write_sample_tables(tmp_dir.path());
    let sdk = CovidTrends::builder()
        .cache_dir(tmp_dir.path())
        .offline(true)
        .warmup_offset(warmup_offset)
        .build()
        .unwrap();
    (sdk, tmp_dir)
}

// ---------------------------------------------------------------------------
// Local HTTP mirror
// ---------------------------------------------------------------------------

/// How the mirror answers the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// 200 with the full body.
    Ok,
    /// 503 with an empty body.
    Unavailable,
    /// 200 announcing the full length but closing after half the body.
    Truncated,
}

#[derive(Default)]
struct MirrorState {
    bodies: HashMap<String, String>,
    failures: usize,
    mode: Option<Reply>,
    requests: usize,
}

/// A one-thread HTTP/1.1 server serving CSV bodies by file name.
///
/// The listener thread lives until the test process exits.
pub struct Mirror {
    pub url: String,
    state: Arc<Mutex<MirrorState>>,
}

impl Mirror {
    /// Serve the sample tables.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(MirrorState {
            bodies: sample_bodies().into_iter().collect(),
            ..Default::default()
        }));
        let shared = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &shared);
            }
        });
        Self { url, state }
    }

    /// Replace the body served for `metric`.
    pub fn set_body(&self, metric: Metric, body: String) {
        let mut state = self.state.lock().unwrap();
        state.bodies.insert(config::csv_file(metric).to_string(), body);
    }

    /// Answer the next `n` requests with 503 before serving normally.
    pub fn fail_next(&self, n: usize) {
        self.state.lock().unwrap().failures = n;
    }

    /// Answer every request with `reply` (`None` restores normal service).
    pub fn set_mode(&self, reply: Option<Reply>) {
        self.state.lock().unwrap().mode = reply;
    }

    /// Requests received so far.
    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }
}

fn serve(mut stream: TcpStream, state: &Mutex<MirrorState>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/");
    let name = path.rsplit('/').next().unwrap_or("").to_string();

    let (reply, body) = {
        let mut state = state.lock().unwrap();
        state.requests += 1;
        let reply = if state.failures > 0 {
            state.failures -= 1;
            Reply::Unavailable
        } else {
            state.mode.unwrap_or(Reply::Ok)
        };
        (reply, state.bodies.get(&name).cloned())
    };

    let response = match (reply, body) {
        (Reply::Unavailable, _) | (_, None) => {
            let status = if reply == Reply::Unavailable {
                "503 Service Unavailable"
            } else {
                "404 Not Found"
            };
            format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
        }
        (Reply::Ok, Some(body)) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        (Reply::Truncated, Some(body)) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            &body[..body.len() / 2]
        ),
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Build an online SDK that downloads from `mirror` into `dir`.
pub fn mirrored_builder(mirror: &Mirror, dir: &Path) -> covid_trends::CovidTrendsBuilder {
    CovidTrends::builder()
        .cache_dir(dir)
        .base_url(&mirror.url)
        .timeout(std::time::Duration::from_secs(5))
        .retries(0)
        .warmup_offset(0)
}

fn quote(field: &str) -> String {
    if field.contains(',') {
        format!("\"{}\"", field)
    } else {
        field.to_string()
    }
}
