use async_trait::async_trait;
use common::error::{RpError, RpResult};
use gloo_net::http::Request;
use wasm_bindgen::JsValue;
use web_sys::{FormData, UrlSearchParams};

use super::{Body, HttpRequest, HttpResponse, Method, Transport};

/// [Transport] backed by the browser fetch API
#[derive(Clone, Copy, Default)]
pub struct FetchTransport;

/// Fetch failures never produced a response, so they are all network errors
fn network_error(error: gloo_net::Error) -> RpError {
    RpError::Network(error.to_string())
}

/// Failure while building a browser body object
fn js_error(error: JsValue) -> RpError {
    RpError::Network(format!("{error:?}"))
}

fn form_params(fields: &[(String, String)]) -> RpResult<UrlSearchParams> {
    let params = UrlSearchParams::new().map_err(js_error)?;
    for (name, value) in fields {
        params.append(name, value);
    }
    Ok(params)
}

fn form_data(fields: &[(String, String)]) -> RpResult<FormData> {
    let data = FormData::new().map_err(js_error)?;
    for (name, value) in fields {
        data.append_with_str(name, value).map_err(js_error)?;
    }
    Ok(data)
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> RpResult<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(json) => builder
                .header("Content-Type", "application/json")
                .body(json),
            Body::Form(fields) => builder.body(form_params(&fields)?),
            Body::Multipart(fields) => builder.body(form_data(&fields)?),
        };
        log::debug!("{:?} {}", request.method, request.url);
        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        Ok(HttpResponse { status, body })
    }
}
