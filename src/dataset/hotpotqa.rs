// src/dataset/hotpotqa.rs — Random HotpotQA samples via the datasets-server API

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::QuestionRecord;
use crate::infra::errors::ReviseLabError;

const SERVICE: &str = "huggingface";
const DATASET: &str = "hotpot_qa";
const CONFIG: &str = "distractor";
const SPLIT: &str = "validation";

/// Draws random rows of the HotpotQA distractor validation split and
/// caches each sample under the data directory.
pub struct HotpotQaSampler {
    client: reqwest::Client,
    base_url: String,
    data_dir: PathBuf,
}

impl HotpotQaSampler {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_base_url(data_dir, "https://datasets-server.huggingface.co".into())
    }

    pub fn with_base_url(data_dir: impl Into<PathBuf>, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            data_dir: data_dir.into(),
        }
    }

    async fn fetch_rows(
        &self,
        offset: usize,
        length: usize,
    ) -> Result<serde_json::Value, ReviseLabError> {
        let offset = offset.to_string();
        let length = length.to_string();
        let resp = self
            .client
            .get(format!("{}/rows", self.base_url))
            .query(&[
                ("dataset", DATASET),
                ("config", CONFIG),
                ("split", SPLIT),
                ("offset", offset.as_str()),
                ("length", length.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ReviseLabError::from_transport(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReviseLabError::external(
                SERVICE,
                format!("HTTP {}: {}", status, body),
            ));
        }
        resp.json()
            .await
            .map_err(|e| ReviseLabError::external(SERVICE, format!("Invalid rows response: {}", e)))
    }

    /// Total number of rows in the split.
    pub async fn num_rows(&self) -> Result<usize, ReviseLabError> {
        let body = self.fetch_rows(0, 1).await?;
        body["num_rows_total"]
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| ReviseLabError::malformed(SERVICE, "missing num_rows_total"))
    }

    /// Sample `n` distinct questions, write them to a timestamped file and
    /// return the records with the file path.
    pub async fn sample(&self, n: usize) -> Result<(Vec<QuestionRecord>, PathBuf), ReviseLabError> {
        tracing::info!("Getting HotpotQA validation data.");
        let total = self.num_rows().await?;
        let offsets = pick_distinct(total, n)?;

        let mut rows = Vec::with_capacity(n);
        for offset in offsets {
            let body = self.fetch_rows(offset, 1).await?;
            let row = body["rows"][0]["row"].clone();
            if row.is_null() {
                return Err(ReviseLabError::malformed(
                    SERVICE,
                    format!("no row at offset {}", offset),
                ));
            }
            rows.push(row);
        }
        tracing::info!("Sampled {} questions from HotpotQA", rows.len());

        let records: Vec<QuestionRecord> = rows
            .iter()
            .map(|r| serde_json::from_value(r.clone()))
            .collect::<Result<_, _>>()
            .map_err(|e| ReviseLabError::malformed(SERVICE, format!("unexpected row shape: {}", e)))?;

        let path = self.write_sample(&rows)?;
        Ok((records, path))
    }

    fn write_sample(&self, rows: &[serde_json::Value]) -> Result<PathBuf, ReviseLabError> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .data_dir
            .join(format!("hotpotqa_subset_{}.json", timestamp));
        write_json(&path, rows)?;
        tracing::info!("Saved HotpotQA subset to {}", path.display());
        Ok(path)
    }
}

fn write_json(path: &Path, rows: &[serde_json::Value]) -> Result<(), ReviseLabError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(rows)?)?;
    Ok(())
}

/// `n` distinct offsets in `0..total`, in draw order.
pub fn pick_distinct(total: usize, n: usize) -> Result<Vec<usize>, ReviseLabError> {
    if n > total {
        return Err(ReviseLabError::Configuration(format!(
            "cannot sample {} questions from a split of {}",
            n, total
        )));
    }

    let mut picked: Vec<usize> = Vec::with_capacity(n);
    let mut buf = [0u8; 8];
    while picked.len() < n {
        getrandom::getrandom(&mut buf)
            .map_err(|e| anyhow::anyhow!("OS random source unavailable: {}", e))?;
        let candidate = (u64::from_le_bytes(buf) % total as u64) as usize;
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    Ok(picked)
}
