use super::super::Result;
use super::ProxyState;
use askama::Template;
use axum::{extract::State, http::Uri, response::Html};

/// The `go-import` page. Paths come straight from the request, so every field is escaped.
#[derive(Template)]
#[template(path = "go_import.html")]
struct GoImportPage<'a> {
    scheme: &'a str,
    host: &'a str,
    path: &'a str,
}

/// Serves the `go-import` page that sends `go get` to the `/_git/` proxy.
pub(super) async fn page(State(state): State<ProxyState>, uri: Uri) -> Result<Html<String>> {
    let config = state.config();
    tracing::debug!(path = uri.path(), "serving go-import page");
    let html = render(&config.public_scheme, &config.public_host, uri.path())?;
    Ok(Html(html))
}

pub(super) fn render(scheme: &str, host: &str, path: &str) -> Result<String> {
    Ok(GoImportPage { scheme, host, path }.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_go_import_meta() {
        let html = render("http", "127.0.0.1:8080", "/github.com/foo/bar@v1").unwrap();
        assert!(html.contains(
            r#"<meta name="go-import" content="127.0.0.1:8080/github.com/foo/bar@v1 git http://127.0.0.1:8080/_git/github.com/foo/bar@v1">"#
        ));
    }

    #[test]
    fn it_escapes_quotes_in_path() {
        let html = render("http", "h", r#"/github.com/a"onload="x"#).unwrap();
        assert!(!html.contains(r#""onload=""#));
        assert!(html.contains("a&#34;onload=&#34;x") || html.contains("a&quot;onload=&quot;x"));
    }

    #[test]
    fn it_escapes_markup_in_host() {
        let html = render("http", "<script>", "/github.com/a").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
