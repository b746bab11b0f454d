//! Magnet URI construction.

use super::TorrentDescriptor;

/// Public trackers added when a descriptor carries none.
pub const DEFAULT_TRACKERS: [&str; 5] = [
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.torrent.eu.org:451/announce",
    "udp://open.stealth.si:80/announce",
    "udp://exodus.desync.com:6969/announce",
];

/// Build a magnet URI for a descriptor.
///
/// The info hash is passed through as-is.
pub fn build_magnet(descriptor: &TorrentDescriptor) -> String {
    let mut magnet = format!("magnet:?xt=urn:btih:{}", descriptor.info_hash);

    if !descriptor.display_name.is_empty() {
        magnet.push_str("&dn=");
        magnet.push_str(&urlencoding::encode(&descriptor.display_name));
    }

    if descriptor.tracker_urls.is_empty() {
        for tracker in DEFAULT_TRACKERS {
            push_tracker(&mut magnet, tracker);
        }
    } else {
        for tracker in &descriptor.tracker_urls {
            push_tracker(&mut magnet, tracker);
        }
    }

    magnet
}

fn push_tracker(magnet: &mut String, tracker: &str) {
    magnet.push_str("&tr=");
    magnet.push_str(&urlencoding::encode(tracker));
}
