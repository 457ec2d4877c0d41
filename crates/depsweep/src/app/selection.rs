//! Parsing the answer to the removal prompt.

use crate::domain::errors::DomainError;
use crate::domain::model::Selection;

/// Parse user input against a listing of `len` entries.
///
/// `all` (any case) selects everything. Otherwise every run of decimal digits is read as a
/// 1-based listing number, so `1,3`, `1 3` and `1;3` are equivalent. Numbers outside the
/// listing and repeats are dropped. Input that selects nothing is invalid.
pub fn parse_selection(input: &str, len: usize) -> Result<Selection, DomainError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok(Selection::All);
    }

    let mut indices: Vec<usize> = Vec::new();
    for number in digit_runs(input).filter_map(|run| run.parse::<usize>().ok()) {
        if number == 0 || number > len {
            continue;
        }
        let index = number - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    if indices.is_empty() {
        return Err(DomainError::InvalidSelection);
    }
    Ok(Selection::Indices(indices))
}

fn digit_runs(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|run| !run.is_empty())
}
