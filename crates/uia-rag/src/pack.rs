//! Step 5: Pack context (§4.6). Concatenates selected chunks, each prefixed
//! `[chunkId] breadcrumb`, stopping once the accumulated character length
//! exceeds `tokenLimit * 4` (a char->token proxy).

use crate::types::Candidate;

const SEPARATOR: &str = "\n\n---\n\n";

pub struct PackedContext {
    pub text: String,
    pub included: Vec<Candidate>,
}

pub fn pack(candidates: &[Candidate], token_limit: u32) -> PackedContext {
    let char_limit = token_limit as usize * 4;
    let mut out = String::new();
    let mut included = Vec::new();

    for c in candidates {
        let entry = format!("[{}] {}\n{}", c.chunk_id, c.breadcrumb, c.text);
        let addition_len = entry.len() + if out.is_empty() { 0 } else { SEPARATOR.len() };
        if !out.is_empty() && out.len() + addition_len > char_limit {
            break;
        }
        if !out.is_empty() {
            out.push_str(SEPARATOR);
        }
        out.push_str(&entry);
        included.push(c.clone());
        if out.len() > char_limit {
            break;
        }
    }

    PackedContext { text: out, included }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, text: &str) -> Candidate {
        Candidate {
            chunk_id: id.to_string(),
            breadcrumb: "Some > Breadcrumb".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn includes_all_when_under_limit() {
        let candidates = vec![candidate("a", "short"), candidate("b", "also short")];
        let packed = pack(&candidates, 1000);
        assert_eq!(packed.included.len(), 2);
        assert!(packed.text.contains("[a]"));
        assert!(packed.text.contains("[b]"));
    }

    #[test]
    fn stops_once_char_budget_exceeded() {
        let long = "x".repeat(500);
        let candidates = vec![candidate("a", &long), candidate("b", &long), candidate("c", &long)];
        let packed = pack(&candidates, 100); // char_limit = 400
        assert!(packed.included.len() < 3);
        assert_eq!(packed.included[0].chunk_id, "a");
    }

    #[test]
    fn empty_candidates_pack_to_empty_string() {
        let packed = pack(&[], 100);
        assert!(packed.text.is_empty());
        assert!(packed.included.is_empty());
    }
}
