//! Page loading over `window.fetch`.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Headers, Request, RequestCache, RequestCredentials, RequestInit, Response,
    Window,
};

use spalite_nav::error::FetchError;
use spalite_nav::{FetchRequest, FetchResponse, FetchResult, PageFetcher};

/// Same-origin, uncached `GET`s. Dropping an unfinished fetch aborts the
/// underlying request.
pub struct DomFetcher {
    window: Window,
}

impl DomFetcher {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn build(&self, request: &FetchRequest) -> Result<(Request, Option<AbortController>), JsValue> {
        let init = RequestInit::new();
        init.set_method(FetchRequest::METHOD);
        init.set_credentials(RequestCredentials::SameOrigin);
        init.set_cache(RequestCache::NoStore);

        let headers = Headers::new()?;
        for (name, value) in &request.headers {
            headers.set(name, value)?;
        }
        init.set_headers(&headers);

        let abort = AbortController::new().ok();
        if let Some(controller) = &abort {
            init.set_signal(Some(&controller.signal()));
        }
        let req = Request::new_with_str_and_init(&request.url, &init)?;
        Ok((req, abort))
    }
}

/// Aborts the request when dropped unless disarmed.
struct AbortOnDrop(Option<AbortController>);

impl AbortOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(controller) = self.0.take() {
            controller.abort();
        }
    }
}

fn transport(err: JsValue) -> FetchError {
    FetchError::Transport(format!("{err:?}"))
}

impl PageFetcher for DomFetcher {
    fn fetch(&self, request: FetchRequest) -> LocalBoxFuture<'static, FetchResult> {
        let built = self.build(&request);
        let window = self.window.clone();
        async move {
            let (req, abort) = built.map_err(transport)?;
            let guard = AbortOnDrop(abort);

            let value = JsFuture::from(window.fetch_with_request(&req))
                .await
                .map_err(transport)?;
            let response: Response = value
                .dyn_into()
                .map_err(|_| FetchError::Malformed("fetch did not yield a Response".into()))?;
            let status = response.status();
            let text = JsFuture::from(response.text().map_err(transport)?)
                .await
                .map_err(transport)?;
            guard.disarm();

            let body = text.as_string().ok_or_else(|| {
                FetchError::Malformed(format!("non-text body from {}", request.url))
            })?;
            Ok(FetchResponse { status, body })
        }
        .boxed_local()
    }
}
