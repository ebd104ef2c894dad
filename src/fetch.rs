//! Team-page fetching. Network I/O sits behind a trait so ingestion can be
//! exercised against canned pages.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

pub const DEFAULT_BASE_URL: &str = "https://www.basketball-reference.com";

const REQUEST_TIMEOUT_SECS: u64 = 10;
// The stats site throttles aggressive crawlers; stay well under its limit.
const REQUEST_PAUSE_MS: u64 = 3000;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn team_page_url(base_url: &str, team: &str, season: &str) -> String {
    format!("{}/teams/{team}/{season}.html", base_url.trim_end_matches('/'))
}

/// One team/season page fetch. An `Err` is a transport failure; the body is
/// returned raw for the extractor to pick tables out of.
pub trait FetchTeamPage {
    fn fetch(&self, team: &str, season: &str) -> Result<String>;
}

pub struct SportsRefClient {
    base_url: String,
}

impl SportsRefClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for SportsRefClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl FetchTeamPage for SportsRefClient {
    fn fetch(&self, team: &str, season: &str) -> Result<String> {
        let client = http_client()?;
        let url = team_page_url(&self.base_url, team, season);
        thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS));
        let resp = client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status}: {url}"));
        }
        Ok(body)
    }
}
