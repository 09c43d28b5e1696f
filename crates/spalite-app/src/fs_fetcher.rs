//! Page fetcher over a local site directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use percent_encoding::percent_decode_str;

use spalite_nav::error::FetchError;
use spalite_nav::url::Url;
use spalite_nav::{FetchRequest, FetchResponse, FetchResult, PageFetcher};

/// Serves page requests from a directory, the way a static file server
/// would. A missing file is a 404.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request URL onto a file under the root. `None` for anything
    /// that would escape it.
    fn file_for(&self, url: &str) -> Option<PathBuf> {
        let url = Url::parse(url)?;
        let decoded = percent_decode_str(&url.path).decode_utf8().ok()?;
        let relative = Path::new(decoded.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn read(&self, request: &FetchRequest) -> FetchResult {
        let Some(file) = self.file_for(&request.url) else {
            return Err(FetchError::Malformed(request.url.clone()));
        };
        match std::fs::read_to_string(&file) {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                Ok(FetchResponse::with_status(404))
            },
            Err(e) => Err(FetchError::Transport(format!("{}: {e}", file.display()))),
        }
    }
}

impl PageFetcher for FsFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult> {
        log::debug!("{} {}", FetchRequest::METHOD, request.url);
        future::ready(self.read(&request)).boxed_local()
    }
}
