/// Returns true when `topic` is matched by the MQTT subscription `filter`.
///
/// `+` matches exactly one level and `#` (last level only) matches the rest,
/// including the parent level itself.
pub fn topic_matches(topic: &str, filter: &str) -> bool {
    // $SYS style topics are never matched by a leading wildcard
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut topic_levels = topic.split('/');
    let mut filter_levels = filter.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
