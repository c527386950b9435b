//! Search & Ranking Engine (spec component C6).
//!
//! Grounded line-for-line in
//! `original_source/services/search_service.py`: `_normalize_query`,
//! `_get_alphabet_files`, `_find_word_matches` (exact match under 3
//! letters, else prefix-descending from full length to 3), and
//! `_calculate_word_match_score`'s formula. Pure synchronous logic over
//! data loaded from [`crate::index_store`]; the only async boundary is
//! reading partition files off disk.

use crate::error::{Error, Result};
use crate::index_store::{self, WordEntry};
use crate::paths::{partition_letter, DataPaths};
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevance,
    Frequency,
    Depth,
}

impl Default for SortBy {
    fn default() -> Self {
        Self::Relevance
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub word: String,
    pub relevant_url: String,
    pub origin_url: String,
    pub depth: u32,
    pub frequency: usize,
    pub relevance_score: i64,
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    pub query_words: Vec<String>,
    pub files_searched: usize,
}

/// Normalizes a raw query string into lowercase words of 2+ letters,
/// matching `_normalize_query`'s `\b[a-zA-Z]{2,}\b` regex.
#[must_use]
pub fn normalize_query(query: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Runs a paginated, ranked search over the index.
pub async fn search(
    paths: &DataPaths,
    query: &str,
    page_limit: usize,
    page_offset: usize,
    sort_by: SortBy,
) -> Result<SearchResponse> {
    let query_words = normalize_query(query);
    if query_words.is_empty() {
        return Ok(SearchResponse {
            results: Vec::new(),
            total_results: 0,
            query_words,
            files_searched: 0,
        });
    }

    let letters: HashSet<&'static str> = query_words.iter().map(|w| partition_letter(w)).collect();
    let mut files_searched = 0;
    let mut all_results = Vec::new();

    for letter in letters {
        let file = paths.storage_file(letter);
        let entries = index_store::load_partition(&file).await?;
        if entries.is_empty() {
            continue;
        }
        files_searched += 1;

        let by_word = group_by_word(entries);
        for query_word in query_words.iter().filter(|w| w.starts_with(letter) || (letter == "other" && !w.chars().next().is_some_and(|c| c.is_ascii_alphabetic()))) {
            for matched_word in find_word_matches(query_word, &by_word) {
                let Some(candidate_entries) = by_word.get(&matched_word) else {
                    continue;
                };
                for entry in candidate_entries {
                    let score = score(query_word, &matched_word, entry);
                    if score > 0 {
                        all_results.push(SearchResult {
                            word: matched_word.clone(),
                            relevant_url: entry.relevant_url.clone(),
                            origin_url: entry.origin_url.clone(),
                            depth: entry.depth,
                            frequency: entry.frequency,
                            relevance_score: score,
                        });
                    }
                }
            }
        }
    }

    if files_searched == 0 {
        return Ok(SearchResponse {
            results: Vec::new(),
            total_results: 0,
            query_words,
            files_searched: 0,
        });
    }

    // Dedupe by relevant_url, keeping the higher-scoring entry.
    let mut by_url: HashMap<String, SearchResult> = HashMap::new();
    for result in all_results {
        by_url
            .entry(result.relevant_url.clone())
            .and_modify(|existing| {
                if result.relevance_score > existing.relevance_score {
                    *existing = result.clone();
                }
            })
            .or_insert(result);
    }

    let mut results: Vec<SearchResult> = by_url.into_values().collect();
    match sort_by {
        SortBy::Relevance => results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score)),
        SortBy::Frequency => results.sort_by(|a, b| b.frequency.cmp(&a.frequency)),
        SortBy::Depth => results.sort_by(|a, b| a.depth.cmp(&b.depth)),
    }

    let total_results = results.len();
    let page: Vec<SearchResult> = results
        .into_iter()
        .skip(page_offset)
        .take(page_limit)
        .collect();

    Ok(SearchResponse {
        results: page,
        total_results,
        query_words,
        files_searched,
    })
}

fn group_by_word(entries: Vec<WordEntry>) -> HashMap<String, Vec<WordEntry>> {
    let mut grouped: HashMap<String, Vec<WordEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.word.clone()).or_default().push(entry);
    }
    grouped
}

/// Matches `_find_word_matches`: words under 3 letters only match
/// exactly; 3+ letter words are matched against progressively shorter
/// prefixes, longest first, down to a 3-letter minimum.
fn find_word_matches(query_word: &str, word_data: &HashMap<String, Vec<WordEntry>>) -> HashSet<String> {
    let mut matches = HashSet::new();

    if query_word.len() < 3 {
        if word_data.contains_key(query_word) {
            matches.insert(query_word.to_string());
        }
        return matches;
    }

    for end in (3..=query_word.len()).rev() {
        let prefix = &query_word[..end];
        if word_data.contains_key(prefix) {
            matches.insert(prefix.to_string());
        }
    }

    matches
}

/// Matches `_calculate_word_match_score`: `frequency * 10`, plus `1000`
/// for an exact match or `int(500 * matched_len/query_len)` for a prefix
/// match, minus `depth * 5`, clamped to zero via integer arithmetic (not
/// floating-point rounding).
fn score(query_word: &str, matched_word: &str, entry: &WordEntry) -> i64 {
    let mut total: i64 = entry.frequency as i64 * 10;

    if query_word.eq_ignore_ascii_case(matched_word) {
        total += 1000;
    } else {
        total += (500 * matched_word.len() as i64) / query_word.len() as i64;
    }

    total -= entry.depth as i64 * 5;

    total.max(0)
}

/// Picks a random word from a random non-empty partition, matching
/// `get_random_word`.
pub async fn random_word(paths: &DataPaths) -> Result<String> {
    let mut rng = rand::rng();
    let letters = index_store::existing_partitions(paths).await?;
    if letters.is_empty() {
        return Err(Error::NotFound("no words found in database".to_string()));
    }

    let letter = letters
        .choose(&mut rng)
        .expect("letters is non-empty, checked above");
    let entries = index_store::load_partition(&paths.storage_file(letter)).await?;
    let words: Vec<&str> = entries.iter().map(|entry| entry.word.as_str()).collect();
    let words: HashSet<&str> = words.into_iter().collect();
    let words: Vec<&str> = words.into_iter().collect();

    words
        .choose(&mut rng)
        .map(|word| (*word).to_string())
        .ok_or_else(|| Error::NotFound("no words found in selected partition".to_string()))
}
