//! Tab completion for member names.
//!
//! The fragment under completion is whatever follows the last space before
//! the cursor. An empty fragment matches every member, which makes a bare
//! Tab at the start of a line cycle in the most recent joiner.

/// Complete the nick fragment ending at `pos` against `candidates`.
///
/// Candidates must already be in roster join order; when several match the
/// last one wins. Returns the edited line and the new cursor position, or
/// `None` when nothing matches.
pub fn complete_nick(line: &str, pos: usize, candidates: &[String]) -> Option<(String, usize)> {
    let pos = pos.min(line.len());
    if !line.is_char_boundary(pos) {
        return None;
    }
    let before = &line[..pos];
    let fragment = before.rsplit(' ').next().unwrap_or(before);

    let nick = candidates.iter().rev().find(|name| name.starts_with(fragment))?;

    let start = pos - fragment.len();
    let mut new_line = String::with_capacity(line.len() + nick.len());
    new_line.push_str(&line[..start]);
    new_line.push_str(nick);
    new_line.push_str(&line[pos..]);

    let new_pos = pos + nick.len() - fragment.len();
    Some((new_line, new_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn completes_last_match_in_join_order() {
        let members = names(&["alice", "alan", "bob"]);
        assert_eq!(complete_nick("al", 2, &members), Some(("alan".to_string(), 4)));
    }

    #[test]
    fn completes_mid_sentence_fragment() {
        let members = names(&["alice", "bob"]);
        assert_eq!(complete_nick("hey bo", 6, &members), Some(("hey bob".to_string(), 7)));
    }

    #[test]
    fn keeps_text_after_the_cursor() {
        let members = names(&["alice"]);
        assert_eq!(
            complete_nick("al are you there", 2, &members),
            Some(("alice are you there".to_string(), 5))
        );
    }

    #[test]
    fn empty_fragment_matches_everyone() {
        let members = names(&["alice", "bob"]);
        assert_eq!(complete_nick("", 0, &members), Some(("bob".to_string(), 3)));
    }

    #[test]
    fn no_match_returns_none() {
        let members = names(&["alice", "bob"]);
        assert_eq!(complete_nick("zz", 2, &members), None);
        assert_eq!(complete_nick("x", 1, &[]), None);
    }

    #[test]
    fn exact_name_completes_to_itself() {
        let members = names(&["bob"]);
        assert_eq!(complete_nick("bob", 3, &members), Some(("bob".to_string(), 3)));
    }

    #[test]
    fn cursor_past_end_is_clamped() {
        let members = names(&["bob"]);
        assert_eq!(complete_nick("bo", 10, &members), Some(("bob".to_string(), 3)));
    }
}
