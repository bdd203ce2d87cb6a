use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

const VERSION_PATTERN: &str =
    r"^(\d+(?:\.\d+)*)([a-z])?((?:_(?:alpha|beta|pre|rc|cvs|svn|git|hg|p)\d*)*)(?:-r(\d+))?$";
const SUFFIX_PATTERN: &str = r"_(alpha|beta|pre|rc|cvs|svn|git|hg|p)(\d*)";

static VERSION_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(VERSION_PATTERN));
static SUFFIX_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(SUFFIX_PATTERN));

fn compiled(re: &'static LazyLock<Result<Regex, regex::Error>>) -> CoreResult<&'static Regex> {
    re.as_ref()
        .map_err(|e| CoreError::Comparator(format!("apk version regex compilation failed: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApkVersion {
    pub numbers: Vec<u64>,
    pub letter: Option<char>,
    pub suffixes: Vec<(i8, u64)>,
    pub revision: u64,
}

// Pre-release suffixes sort below a bare release; snapshot suffixes and `_p`
// (patch) above it, in apk-tools order.
fn suffix_rank(s: &str) -> i8 {
    match s {
        "alpha" => -4,
        "beta" => -3,
        "pre" => -2,
        "rc" => -1,
        "cvs" => 1,
        "svn" => 2,
        "git" => 3,
        "hg" => 4,
        _ => 5,
    }
}

fn parse_num(s: &str, full: &str) -> CoreResult<u64> {
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u64>().map_err(|_| {
        CoreError::Comparator(format!("apk version component out of range in {:?}", full))
    })
}

pub fn parse_version(s: &str) -> CoreResult<ApkVersion> {
    let s = s.trim();
    let version_re = compiled(&VERSION_RE)?;
    let suffix_re = compiled(&SUFFIX_RE)?;

    let caps = version_re
        .captures(s)
        .ok_or_else(|| CoreError::Comparator(format!("malformed apk version {:?}", s)))?;

    let numbers = caps[1]
        .split('.')
        .map(|n| parse_num(n, s))
        .collect::<CoreResult<Vec<u64>>>()?;
    let letter = caps.get(2).and_then(|m| m.as_str().chars().next());
    let mut suffixes = Vec::new();
    if let Some(m) = caps.get(3) {
        for sc in suffix_re.captures_iter(m.as_str()) {
            suffixes.push((suffix_rank(&sc[1]), parse_num(&sc[2], s)?));
        }
    }
    let revision = match caps.get(4) {
        Some(m) => parse_num(m.as_str(), s)?,
        None => 0,
    };
    Ok(ApkVersion {
        numbers,
        letter,
        suffixes,
        revision,
    })
}

pub fn compare_versions(a: &str, b: &str) -> CoreResult<Ordering> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;
    Ok(compare_parsed(&a, &b))
}

fn compare_parsed(a: &ApkVersion, b: &ApkVersion) -> Ordering {
    // Vec ordering already makes a longer numeric prefix newer: 1.2 < 1.2.1.
    let ord = a.numbers.cmp(&b.numbers).then_with(|| a.letter.cmp(&b.letter));
    if ord != Ordering::Equal {
        return ord;
    }
    let n = a.suffixes.len().max(b.suffixes.len());
    for i in 0..n {
        // A missing suffix behaves like a bare release.
        let sa = a.suffixes.get(i).copied().unwrap_or((0, 0));
        let sb = b.suffixes.get(i).copied().unwrap_or((0, 0));
        let ord = sa.cmp(&sb);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.revision.cmp(&b.revision)
}
