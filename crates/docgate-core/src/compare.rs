use std::cmp::Ordering;

use docgate_types::CompareMode;

/// Whether `build` is strictly newer than `published` under `mode`.
pub fn is_newer(build: &str, published: &str, mode: CompareMode) -> bool {
    match mode {
        CompareMode::Lexicographic => build > published,
        CompareMode::Semantic => semantic_is_newer(build, published),
    }
}

fn semantic_is_newer(build: &str, published: &str) -> bool {
    let (Some(b), Some(p)) = (parse_version(build), parse_version(published)) else {
        return build > published;
    };

    match b.triple.cmp(&p.triple) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match (b.suffix.is_empty(), p.suffix.is_empty()) {
            (true, true) => false,
            // a release supersedes its own pre-releases
            (true, false) => true,
            (false, true) => false,
            (false, false) => build > published,
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedVersion<'a> {
    triple: (u64, u64, u64),
    suffix: &'a str,
}

fn parse_version(v: &str) -> Option<ParsedVersion<'_>> {
    let v = v.trim();
    let v = v.strip_prefix('v').unwrap_or(v);
    let split = v.find(['-', '+']).unwrap_or(v.len());
    let (core, suffix) = v.split_at(split);

    let mut iter = core.split('.');
    let maj = iter.next()?.parse::<u64>().ok()?;
    let min = iter.next()?.parse::<u64>().ok()?;
    let pat = iter.next()?.parse::<u64>().ok()?;
    if iter.next().is_some() {
        return None;
    }

    Some(ParsedVersion {
        triple: (maj, min, pat),
        suffix,
    })
}
