use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebVersion<'a> {
    pub epoch: u64,
    pub upstream: &'a str,
    pub revision: &'a str,
}

/// Splits `[epoch:]upstream_version[-debian_revision]`.
pub fn parse_version(s: &str) -> CoreResult<DebVersion<'_>> {
    let s = s.trim();
    let (epoch, rest) = match s.split_once(':') {
        Some((e, rest)) => {
            let epoch = e.parse::<u64>().map_err(|_| {
                CoreError::Comparator(format!("invalid dpkg epoch in {:?}", s))
            })?;
            (epoch, rest)
        }
        None => (0, s),
    };
    let (upstream, revision) = match rest.rsplit_once('-') {
        Some((u, r)) => (u, r),
        None => (rest, ""),
    };
    if upstream.is_empty() {
        return Err(CoreError::Comparator(format!(
            "empty dpkg upstream version in {:?}",
            s
        )));
    }
    if !upstream.as_bytes()[0].is_ascii_digit() {
        return Err(CoreError::Comparator(format!(
            "dpkg upstream version must start with a digit: {:?}",
            s
        )));
    }
    Ok(DebVersion {
        epoch,
        upstream,
        revision,
    })
}

pub fn compare_versions(a: &str, b: &str) -> CoreResult<Ordering> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;
    Ok(a.epoch
        .cmp(&b.epoch)
        .then_with(|| verrevcmp(a.upstream, b.upstream))
        .then_with(|| verrevcmp(a.revision, b.revision)))
}

fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => c as i32,
        Some(b'~') => -1,
        Some(c) => c as i32 + 256,
    }
}

/// dpkg ordering of one upstream version or revision string.
pub fn verrevcmp(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();

    while !a.is_empty() || !b.is_empty() {
        while a.first().is_some_and(|c| !c.is_ascii_digit())
            || b.first().is_some_and(|c| !c.is_ascii_digit())
        {
            let ac = order(a.first().copied());
            let bc = order(b.first().copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            if !a.is_empty() {
                a = &a[1..];
            }
            if !b.is_empty() {
                b = &b[1..];
            }
        }
        while a.first() == Some(&b'0') {
            a = &a[1..];
        }
        while b.first() == Some(&b'0') {
            b = &b[1..];
        }
        let mut first_diff = Ordering::Equal;
        while let (Some(ca), Some(cb)) = (a.first(), b.first()) {
            if !ca.is_ascii_digit() || !cb.is_ascii_digit() {
                break;
            }
            if first_diff == Ordering::Equal {
                first_diff = ca.cmp(cb);
            }
            a = &a[1..];
            b = &b[1..];
        }
        if a.first().is_some_and(u8::is_ascii_digit) {
            return Ordering::Greater;
        }
        if b.first().is_some_and(u8::is_ascii_digit) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }
    Ordering::Equal
}
