//! Archive download over HTTP(S).

use std::path::Path;

use settings::constants::network;
use tokio::io::AsyncWriteExt;

use crate::error::InstallError;
use crate::installer::{report, ProgressSender};

/// Download progress occupies 5%..50% of the install.
const DOWNLOAD_START: u64 = 5;
const DOWNLOAD_SPAN: u64 = 45;

/// HTTP client configured for the bootstrap download.
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Result<Self, InstallError> {
        let client = reqwest::Client::builder()
            .connect_timeout(network::CONNECT_TIMEOUT)
            .read_timeout(network::READ_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(network::MAX_REDIRECTS))
            .user_agent(concat!("mobilecli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Stream `url` into `dest`, reporting progress when the size is known.
    ///
    /// Returns the number of bytes written.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressSender,
    ) -> Result<u64, InstallError> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        if response.url().as_str() != url {
            tracing::debug!("Redirected to {}", response.url());
        }

        let total = response.content_length().filter(|&len| len > 0);
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(InstallError::io("create", dest))?;

        let mut downloaded: u64 = 0;
        let mut last_percent = None;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(InstallError::io("write", dest))?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total {
                let percent = download_percent(downloaded, total);
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    report(
                        progress,
                        percent,
                        format!("Downloading: {}KB / {}KB", downloaded / 1024, total / 1024),
                    );
                }
            }
        }
        file.flush().await.map_err(InstallError::io("flush", dest))?;

        tracing::info!("Bootstrap downloaded: {} bytes", downloaded);
        Ok(downloaded)
    }
}

/// Map bytes received onto the 5..=50 band.
fn download_percent(downloaded: u64, total: u64) -> u8 {
    let fraction = (downloaded.min(total) * DOWNLOAD_SPAN) / total;
    (DOWNLOAD_START + fraction) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 100, 5 ; "nothing yet")]
    #[test_case(50, 100, 27 ; "halfway")]
    #[test_case(100, 100, 50 ; "done")]
    #[test_case(150, 100, 50 ; "server sent more than announced")]
    fn percent_stays_in_download_band(downloaded: u64, total: u64, expected: u8) {
        assert_eq!(download_percent(downloaded, total), expected);
    }
}
