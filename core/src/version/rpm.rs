use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evr<'a> {
    pub epoch: u64,
    pub version: &'a str,
    pub release: &'a str,
}

/// Splits `[epoch:]version[-release]`.
pub fn parse_evr(s: &str) -> CoreResult<Evr<'_>> {
    let s = s.trim();
    let (epoch, rest) = match s.split_once(':') {
        Some((e, rest)) => {
            let epoch = e.parse::<u64>().map_err(|_| {
                CoreError::Comparator(format!("invalid rpm epoch in {:?}", s))
            })?;
            (epoch, rest)
        }
        None => (0, s),
    };
    let (version, release) = match rest.rsplit_once('-') {
        Some((v, r)) => (v, r),
        None => (rest, ""),
    };
    if version.is_empty() {
        return Err(CoreError::Comparator(format!("empty rpm version in {:?}", s)));
    }
    Ok(Evr {
        epoch,
        version,
        release,
    })
}

pub fn compare_evr(a: &str, b: &str) -> CoreResult<Ordering> {
    let a = parse_evr(a)?;
    let b = parse_evr(b)?;
    let ord = a
        .epoch
        .cmp(&b.epoch)
        .then_with(|| rpmvercmp(a.version, b.version));
    if ord != Ordering::Equal {
        return Ok(ord);
    }
    // A missing release on either side matches any release.
    if a.release.is_empty() || b.release.is_empty() {
        return Ok(Ordering::Equal);
    }
    Ok(rpmvercmp(a.release, b.release))
}

fn is_separator(c: u8) -> bool {
    !c.is_ascii_alphanumeric() && c != b'~' && c != b'^'
}

/// Segment-wise comparison used by rpm for both versions and releases.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let mut one = a.as_bytes();
    let mut two = b.as_bytes();

    while !one.is_empty() || !two.is_empty() {
        while let Some((&c, rest)) = one.split_first() {
            if !is_separator(c) {
                break;
            }
            one = rest;
        }
        while let Some((&c, rest)) = two.split_first() {
            if !is_separator(c) {
                break;
            }
            two = rest;
        }

        // '~' sorts before everything, even the end of the string.
        if one.first() == Some(&b'~') || two.first() == Some(&b'~') {
            if one.first() != Some(&b'~') {
                return Ordering::Greater;
            }
            if two.first() != Some(&b'~') {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        // '^' sorts after the end of the string but before anything else.
        if one.first() == Some(&b'^') || two.first() == Some(&b'^') {
            if one.is_empty() {
                return Ordering::Less;
            }
            if two.is_empty() {
                return Ordering::Greater;
            }
            if one.first() != Some(&b'^') {
                return Ordering::Greater;
            }
            if two.first() != Some(&b'^') {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        if one.is_empty() || two.is_empty() {
            break;
        }

        let numeric = one[0].is_ascii_digit();
        let take = |s: &[u8]| -> usize {
            s.iter()
                .take_while(|c| {
                    if numeric {
                        c.is_ascii_digit()
                    } else {
                        c.is_ascii_alphabetic()
                    }
                })
                .count()
        };
        let (n1, n2) = (take(one), take(two));
        let (seg1, seg2) = (&one[..n1], &two[..n2]);
        one = &one[n1..];
        two = &two[n2..];

        // Segments of different kinds: numeric is newer.
        if seg2.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            let s1 = strip_leading_zeros(seg1);
            let s2 = strip_leading_zeros(seg2);
            s1.len().cmp(&s2.len()).then_with(|| s1.cmp(s2))
        } else {
            seg1.cmp(seg2)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (one.is_empty(), two.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn strip_leading_zeros(s: &[u8]) -> &[u8] {
    let n = s.iter().take_while(|&&c| c == b'0').count();
    &s[n..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpmvercmp_matches_reference_cases() {
        assert_eq!(rpmvercmp("1.0", "1.0"), Ordering::Equal);
        assert_eq!(rpmvercmp("1.0", "2.0"), Ordering::Less);
        assert_eq!(rpmvercmp("2.0.1", "2.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.2.8", "1.2.10"), Ordering::Less);
        assert_eq!(rpmvercmp("1.010", "1.9"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.0a", "1.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.0", "1.0a"), Ordering::Less);
        assert_eq!(rpmvercmp("2a", "2.0"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0~rc1", "1.0"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0^git1", "1.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.0^git1", "1.0.1"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0_1", "1.0.1"), Ordering::Equal);
    }

    #[test]
    fn epoch_dominates_version() {
        assert_eq!(compare_evr("1:1.0-1", "2.0-1").unwrap(), Ordering::Greater);
        assert_eq!(
            compare_evr("7.29.0-35.el7", "7.29.0-59.el7").unwrap(),
            Ordering::Less
        );
        assert_eq!(compare_evr("1.2.8", "1.2.8-3").unwrap(), Ordering::Equal);
        assert!(compare_evr("x:1.0", "1.0").is_err());
    }
}
