use super::super::{Error, RefAdvertisement, Result};
use std::io::Write;

pub(crate) async fn run(url: String, commitish: String, dump: bool) -> Result<()> {
    let url = format!(
        "{}/info/refs?service=git-upload-pack",
        url.trim_end_matches('/')
    );
    tracing::info!(%url, %commitish, "fetching ref advertisement");

    let res = reqwest::get(&url).await?.error_for_status()?.bytes().await?;

    let (mut advertisement, skipped) = RefAdvertisement::from_reader(&res[..])?;
    for line in &skipped {
        tracing::warn!(line = %line.line, reason = %line.reason, "skipped advertisement line");
    }

    let id = advertisement.set_master(&commitish).map_err(|err| match err {
        Error::NotFound(_) => Error::NotFound(format!("{commitish:?} not found at {url}")),
        err => err,
    })?;

    if dump {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&advertisement.to_bytes()?)?;
        stdout.flush()?;
    } else {
        println!("{id}");
    }
    Ok(())
}
