use super::super::{git_protocol::RefAdvertisement, Error, Result};
use super::{path::split_path_and_commitish, ProxyState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, Method, Uri},
    response::Response,
};
use futures_util::TryStreamExt;

const INFO_REFS: &str = "info/refs";

/// Headers that describe one hop, not the message, and so never cross the proxy.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Asks for protocol v2. Only v0/v1 advertisements can be rewritten, so it never goes upstream.
static GIT_PROTOCOL: HeaderName = HeaderName::from_static("git-protocol");

/// Forwards `/_git/<host>/<repo>...` upstream, pinning master on `info/refs` replies.
pub(super) async fn git(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response> {
    let config = state.config();
    let (path, commitish) = split_path_and_commitish(&path);

    let host = path.split('/').next().unwrap_or_default();
    if !config.is_allowed(host) {
        return Err(Error::NotFound(format!("upstream host {host:?} is not proxied")));
    }

    let mut url = format!("{}://{path}", config.upstream_scheme);
    if let Some(query) = uri.query() {
        url = format!("{url}?{query}");
    }

    let rewrite = path.ends_with(INFO_REFS) && !commitish.is_empty();
    tracing::info!(%method, %url, %commitish, rewrite, "proxying git request");

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|err| Error::InvalidArgs(format!("cannot read request body: {err}")))?;

    let res = state
        .client
        .request(method, &url)
        .headers(upstream_headers(&headers, rewrite))
        .body(body)
        .send()
        .await?;

    let status = res.status();
    if !rewrite || !status.is_success() {
        let headers = copy_headers(res.headers(), &[]);
        let stream = res.bytes_stream().inspect_err(|err| {
            tracing::warn!(error = %err, "upstream body stream failed");
        });
        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        return Ok(response);
    }

    let headers = copy_headers(res.headers(), &[header::CONTENT_LENGTH]);
    let bytes = res.bytes().await?;
    let pinned = pin_master(&bytes, &commitish)?;

    let mut response = Response::new(Body::from(pinned));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Rewrites an upstream `info/refs` body so master points at `commitish`.
pub(super) fn pin_master(body: &[u8], commitish: &str) -> Result<Vec<u8>> {
    let (mut advertisement, skipped) = RefAdvertisement::from_reader(body)?;
    if !skipped.is_empty() {
        tracing::warn!(count = skipped.len(), "upstream advertisement had unparsable lines");
    }

    let id = advertisement.set_master(commitish)?;
    tracing::info!(commitish, %id, "pinned refs/heads/master");
    advertisement.to_bytes()
}

/// Request headers sent upstream for a client request.
fn upstream_headers(headers: &HeaderMap, rewrite: bool) -> HeaderMap {
    let mut upstream = copy_headers(headers, &[header::CONTENT_LENGTH, GIT_PROTOCOL.clone()]);
    if rewrite {
        // The advertisement has to be readable here, so ask for it uncompressed.
        upstream.remove(header::ACCEPT_ENCODING);
    }
    upstream
}

fn copy_headers(from: &HeaderMap, skip: &[HeaderName]) -> HeaderMap {
    from.iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(*name) && !skip.contains(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const ADVERTISEMENT: &[u8] = b"001e# service=git-upload-pack\n0000\
        004cc7d3d3371baa35587fb66d8a79c6d999a4dafd8e HEAD\0side-band-64k agent=git/2\n\
        003fc7d3d3371baa35587fb66d8a79c6d999a4dafd8e refs/heads/master\n\
        004448da4910b78e24d8d3a831839cc751700ddc6e10 refs/heads/update-docs\n\
        0000";

    #[test]
    fn it_pins_master_in_upstream_body() {
        let pinned = pin_master(ADVERTISEMENT, "update-docs").unwrap();
        let (adv, _) = RefAdvertisement::from_reader(&pinned[..]).unwrap();
        assert_eq!(
            adv.get("refs/heads/master").unwrap().to_string(),
            "48da4910b78e24d8d3a831839cc751700ddc6e10"
        );
        assert_eq!(pinned.len(), ADVERTISEMENT.len());
    }

    #[test]
    fn it_reports_unknown_commitish() {
        let err = pin_master(ADVERTISEMENT, "does-not-exist").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn it_reports_garbage_upstream_body() {
        let err = pin_master(b"<html>oops</html>", "master").unwrap_err();
        assert!(matches!(err, Error::Framing(_)));
    }

    #[test]
    fn it_keeps_upstream_on_protocol_v0() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("git-protocol"),
            HeaderValue::from_static("version=2"),
        );
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("git/2.43.0"));

        let upstream = upstream_headers(&headers, true);
        assert!(upstream.get("git-protocol").is_none());
        assert!(upstream.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(upstream.get(header::USER_AGENT).unwrap(), "git/2.43.0");

        let upstream = upstream_headers(&headers, false);
        assert!(upstream.get("git-protocol").is_none());
        assert_eq!(upstream.get(header::ACCEPT_ENCODING).unwrap(), "gzip");
    }

    #[test]
    fn it_rejects_protocol_v2_replies() {
        let body = b"000eversion 2
0015agent=git/2.43.0
0013ls-refs=unborn
0000";
        let err = pin_master(body, "master").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn it_drops_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:8080"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-git-upload-pack-advertisement"),
        );

        let copied = copy_headers(&headers, &[header::CONTENT_LENGTH]);
        assert_eq!(copied.len(), 1);
        assert!(copied.contains_key(header::CONTENT_TYPE));
    }
}
