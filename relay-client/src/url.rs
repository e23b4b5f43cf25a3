/// Joins a server base URL and a channel path into the URL used for both
/// subscribing and publishing. A missing leading slash on the channel is added.
pub fn channel_url(base_url: &str, channel: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if channel.starts_with('/') {
        format!("{base}{channel}")
    } else {
        format!("{base}/{channel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_channel() {
        assert_eq!(
            channel_url("http://localhost:4000", "/room1"),
            "http://localhost:4000/room1"
        );
    }

    #[test]
    fn tolerates_trailing_and_missing_slashes() {
        assert_eq!(
            channel_url("http://localhost:4000/", "room1"),
            "http://localhost:4000/room1"
        );
        assert_eq!(
            channel_url("http://localhost:4000//", "/a/b"),
            "http://localhost:4000/a/b"
        );
    }
}
