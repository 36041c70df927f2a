//! Fuzzy command lookup for the `:` prompt.
//!
//! Used to suggest what the user probably meant when a command does not
//! parse, matching against both command names and their labels.

use actions::{CommandInfo, COMMANDS};

/// Most suggestions shown after an unknown command.
const MAX_SUGGESTIONS: usize = 3;

/// Score a fuzzy match; lower is better, `None` when the query is not a
/// subsequence of the target. Word starts are free, gaps cost their length.
fn fuzzy_score(query: &str, target: &str) -> Option<u32> {
    if query.is_empty() {
        return Some(0);
    }

    let query_lower: Vec<char> = query.chars().flat_map(|c| c.to_lowercase()).collect();
    let target_lower: Vec<char> = target.chars().flat_map(|c| c.to_lowercase()).collect();

    let mut query_idx = 0;
    let mut score: u32 = 0;
    let mut last_match_pos: Option<usize> = None;

    for (target_idx, &target_char) in target_lower.iter().enumerate() {
        if query_idx < query_lower.len() && target_char == query_lower[query_idx] {
            let at_word_start = target_idx == 0
                || matches!(target_lower.get(target_idx - 1), Some(' ' | '-'));
            if !at_word_start {
                score += 1;
            }

            if let Some(last) = last_match_pos {
                if target_idx > last + 1 {
                    score += (target_idx - last - 1) as u32;
                }
            }

            last_match_pos = Some(target_idx);
            query_idx += 1;
        }
    }

    (query_idx == query_lower.len()).then_some(score)
}

/// Best score for a command across its name and label.
fn command_score(query: &str, info: &CommandInfo) -> Option<u32> {
    [fuzzy_score(query, info.name), fuzzy_score(query, info.label)]
        .into_iter()
        .flatten()
        .min()
}

/// Commands matching `query`, best first.
pub fn search(query: &str) -> Vec<&'static CommandInfo> {
    let mut scored: Vec<(u32, &'static CommandInfo)> = COMMANDS
        .iter()
        .filter_map(|info| command_score(query, info).map(|score| (score, info)))
        .collect();
    // Stable sort keeps declaration order among equal scores
    scored.sort_by_key(|&(score, _)| score);
    scored.into_iter().map(|(_, info)| info).collect()
}

/// "Did you mean" line for an unknown command, if anything is close.
pub fn suggest(query: &str) -> Option<String> {
    let names: Vec<String> = search(query)
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|info| format!(":{}", info.name))
        .collect();
    (!query.is_empty() && !names.is_empty()).then(|| format!("Did you mean {}?", names.join(", ")))
}
