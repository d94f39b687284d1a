/// Splits a request path into the upstream repository path and the commit-ish pinned in it.
///
/// The commit-ish is whatever follows the first `@` of a segment, either as a segment of its
/// own (`/github.com/foo/@master/bar.git`) or glued onto one (`/github.com/coreos/etcd@v0.1.0`).
/// Without an `@` the commit-ish is empty.
pub fn split_path_and_commitish(path: &str) -> (String, String) {
    let mut commitish = "";
    let mut parts: Vec<&str> = vec![];

    for part in path.trim_matches('/').split('/') {
        let part = match part.split_once('@') {
            Some((head, tail)) => {
                commitish = tail;
                head
            }
            None => part,
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }

    (parts.join("/"), commitish.trim_matches('@').to_string())
}
