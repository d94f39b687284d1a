use super::super::{Error, ObjectId, Result, SHA1_HEX_SIZE};
use super::pkt_line::{self, PktLine};
use std::collections::HashMap;
use std::io::Read;

pub const UPLOAD_PACK_SERVICE: &str = "# service=git-upload-pack";
pub const HEAD: &str = "HEAD";
pub const MASTER: &str = "refs/heads/master";

const SERVICE_PREFIX: &[u8] = b"# service=";

/// A line the parser dropped, kept so callers can see what was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: String,
    pub reason: String,
}

/// The ref listing `git-upload-pack` sends in reply to `info/refs`.
///
/// Built by [`RefAdvertisement::parse`], optionally pinned with
/// [`RefAdvertisement::set_master`], then written back out with
/// [`RefAdvertisement::serialize`]. Refs keep the order they were advertised in, which also
/// fixes the order commit-ish lookups walk them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefAdvertisement {
    head: ObjectId,
    capabilities: String,
    refs: Refs,
}

/// Refs in advertised order, indexed by name so overwrites stay cheap on large listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Refs {
    entries: Vec<(String, ObjectId)>,
    index: HashMap<String, usize>,
}

impl Refs {
    fn get(&self, name: &str) -> Option<ObjectId> {
        self.index.get(name).map(|&pos| self.entries[pos].1)
    }

    fn insert(&mut self, name: String, id: ObjectId) {
        match self.index.get(&name) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                tracing::debug!(%name, old = %entry.1, new = %id, "replacing ref");
                entry.1 = id;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, id));
            }
        }
    }

    fn iter(&self) -> std::slice::Iter<'_, (String, ObjectId)> {
        self.entries.iter()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RefAdvertisement {
    /// Parses decoded pkt-lines.
    ///
    /// Ref lines that cannot be understood are not fatal: they are logged and handed back
    /// alongside the advertisement. Only an empty listing, a foreign service announcement or
    /// a listing without `HEAD` is rejected.
    pub fn parse(lines: &[PktLine]) -> Result<(Self, Vec<SkippedLine>)> {
        // Decoded lines are already trimmed; lines built in memory (say, by `serialize`)
        // still end in a newline.
        let mut texts = lines
            .iter()
            .filter_map(PktLine::content)
            .map(<[u8]>::trim_ascii_end)
            .peekable();

        let opening = *texts
            .peek()
            .ok_or_else(|| Error::Protocol("empty ref advertisement".into()))?;
        if opening == UPLOAD_PACK_SERVICE.as_bytes() {
            texts.next();
        } else if opening.starts_with(SERVICE_PREFIX) {
            return Err(Error::Protocol(format!(
                "unexpected service announcement {:?}",
                String::from_utf8_lossy(opening)
            )));
        } else {
            tracing::debug!("advertisement has no service announcement");
        }

        let first = texts
            .next()
            .ok_or_else(|| Error::Protocol("ref advertisement lists no refs".into()))?;

        let mut skipped = vec![];
        let (first, capabilities) = split_capabilities(first, &mut skipped);

        let mut refs = Refs::default();
        for text in std::iter::once(first).chain(texts) {
            match parse_ref_line(text) {
                Ok((name, id)) => refs.insert(name, id),
                Err(reason) => skip(&mut skipped, text, reason),
            }
        }

        let head = refs
            .get(HEAD)
            .ok_or_else(|| Error::Protocol("ref advertisement has no HEAD".into()))?;

        tracing::debug!(
            refs = refs.len(),
            skipped = skipped.len(),
            %head,
            "parsed ref advertisement"
        );

        Ok((
            Self {
                head,
                capabilities,
                refs,
            },
            skipped,
        ))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, Vec<SkippedLine>)> {
        let lines = pkt_line::decode(reader)?;
        Self::parse(&lines)
    }

    pub fn head(&self) -> ObjectId {
        self.head
    }

    pub fn capabilities(&self) -> &str {
        &self.capabilities
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.refs.get(name)
    }

    /// All refs in advertised order, `HEAD` included.
    pub fn refs(&self) -> impl Iterator<Item = (&str, ObjectId)> + '_ {
        self.refs.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Turns a branch/tag name, an object id prefix or a full object id into an object id.
    ///
    /// A 40 character query is taken as-is without looking at the refs. Anything shorter is
    /// matched first as a ref name suffix, then as an object id prefix, each pass walking the
    /// refs in advertised order.
    pub fn resolve_commitish(&self, query: &str) -> Result<ObjectId> {
        if query.len() == SHA1_HEX_SIZE {
            return query
                .parse()
                .map_err(|_| Error::NotFound(format!("{query:?} is not an object id")));
        }
        if query.is_empty() {
            return Err(Error::NotFound("empty commit-ish".into()));
        }

        let by_name = self.refs.iter().find(|(name, _)| name.ends_with(query));
        if let Some((name, id)) = by_name {
            tracing::debug!(query, %name, %id, "resolved commit-ish by ref name");
            return Ok(*id);
        }

        let prefix = query.to_ascii_lowercase();
        let by_id = self.refs.iter().find(|(_, id)| id.starts_with(&prefix));
        if let Some((name, id)) = by_id {
            tracing::debug!(query, %name, %id, "resolved commit-ish by object id prefix");
            return Ok(*id);
        }

        Err(Error::NotFound(format!("commit-ish {query:?} not found")))
    }

    /// Points `refs/heads/master` at whatever `query` resolves to.
    ///
    /// Leaves the advertisement untouched when resolution fails.
    pub fn set_master(&mut self, query: &str) -> Result<ObjectId> {
        let id = self.resolve_commitish(query)?;
        self.refs.insert(MASTER.into(), id);
        Ok(id)
    }

    pub fn serialize(&self) -> Vec<PktLine> {
        let mut lines = Vec::with_capacity(self.refs.len() + 3);
        lines.push(PktLine::from(format!("{UPLOAD_PACK_SERVICE}\n").as_str()));
        lines.push(PktLine::flush());
        lines.push(PktLine::from(
            format!("{} {HEAD}\0{}\n", self.head, self.capabilities).as_str(),
        ));
        lines.extend(
            self.refs
                .iter()
                .filter(|(name, _)| name != HEAD)
                .map(|(name, id)| PktLine::from(format!("{id} {name}\n").as_str())),
        );
        lines.push(PktLine::flush());
        lines
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        pkt_line::encode(&self.serialize())
    }
}

fn split_capabilities<'a>(line: &'a [u8], skipped: &mut Vec<SkippedLine>) -> (&'a [u8], String) {
    let Some(pos) = line.iter().position(|b| *b == 0) else {
        return (line, String::new());
    };
    let (line, rest) = (&line[..pos], &line[pos + 1..]);

    // Capabilities end at a second NUL, if a server ever sends one.
    let capabilities = match rest.iter().position(|b| *b == 0) {
        Some(end) => {
            skip(skipped, &rest[end + 1..], "trailing data after capabilities".into());
            &rest[..end]
        }
        None => rest,
    };

    (line, String::from_utf8_lossy(capabilities).into_owned())
}

fn parse_ref_line(text: &[u8]) -> std::result::Result<(String, ObjectId), String> {
    let text = std::str::from_utf8(text).map_err(|_| "not valid utf-8".to_string())?;
    let (id, name) = text
        .split_once(' ')
        .ok_or_else(|| "no space between object id and ref name".to_string())?;

    if id.len() != SHA1_HEX_SIZE {
        return Err(format!("object id is {} characters long", id.len()));
    }
    let id = id
        .parse::<ObjectId>()
        .map_err(|_| "object id is not hexadecimal".to_string())?;

    if name.is_empty() || name.contains(['\0', ' ']) {
        return Err("malformed ref name".into());
    }

    Ok((name.to_string(), id))
}

fn skip(skipped: &mut Vec<SkippedLine>, text: &[u8], reason: String) {
    let line = String::from_utf8_lossy(text).into_owned();
    tracing::warn!(%line, %reason, "skipping unrecognised advertisement line");
    skipped.push(SkippedLine { line, reason });
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn object_id() -> impl Strategy<Value = ObjectId> {
        any::<[u8; 20]>().prop_map(ObjectId::from)
    }

    fn ref_name() -> impl Strategy<Value = String> {
        "refs/(heads|tags|pull)/[a-z0-9._-]{1,24}"
    }

    fn advertisement_bytes() -> impl Strategy<Value = Vec<u8>> {
        (
            object_id(),
            "[a-z0-9=/_-]{0,16}( [a-z0-9=/_-]{1,16}){0,6}",
            prop::collection::btree_map(ref_name(), object_id(), 0..24),
        )
            .prop_map(|(head, caps, refs)| {
                let mut lines = vec![
                    PktLine::from("# service=git-upload-pack\n"),
                    PktLine::flush(),
                    PktLine::from(format!("{head} HEAD\0{caps}\n").as_str()),
                ];
                for (name, id) in refs {
                    lines.push(PktLine::from(format!("{id} {name}\n").as_str()));
                }
                lines.push(PktLine::flush());
                pkt_line::encode(&lines).unwrap()
            })
    }

    fn as_map(adv: &RefAdvertisement) -> BTreeMap<String, ObjectId> {
        adv.refs().map(|(name, id)| (name.to_string(), id)).collect()
    }

    proptest! {
        #[test]
        fn prop_serialize_then_parse_is_stable(bytes in advertisement_bytes()) {
            let (adv, skipped) = RefAdvertisement::from_reader(&bytes[..]).unwrap();
            prop_assert!(skipped.is_empty());

            let (again, _) = RefAdvertisement::parse(&adv.serialize()).unwrap();
            prop_assert_eq!(again.head(), adv.head());
            prop_assert_eq!(again.capabilities(), adv.capabilities());
            prop_assert_eq!(as_map(&again), as_map(&adv));

            prop_assert_eq!(adv.to_bytes().unwrap().len(), bytes.len());
        }
    }
}
