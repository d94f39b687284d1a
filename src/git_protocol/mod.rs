mod pkt_line;
mod ref_advertisement;

pub use pkt_line::{decode, encode, PktLine, PktLineReader, MAX_PKT_LEN, MAX_PKT_PAYLOAD};
pub use ref_advertisement::{RefAdvertisement, SkippedLine, HEAD, MASTER, UPLOAD_PACK_SERVICE};
