/*!

  Shared pieces of the puzz.link URL format: `https://puzz.link/p?<kind>/<W>/<H>/<body>`,
  with bodies written in base-36 (and base-16 for clue digits).

*/

pub fn char_to_base36(c: u8) -> i32 {
  match c {
    b'0'..=b'9' => (c - b'0') as i32,
    _           => (c - b'a' + 10) as i32,
  }
}

pub fn base36_to_char(n: i32) -> char {
  debug_assert!((0..36).contains(&n));
  if n < 10 {
    (b'0' + n as u8) as char
  } else {
    (b'a' + (n - 10) as u8) as char
  }
}

pub fn base16_to_char(n: i32) -> char {
  debug_assert!((0..16).contains(&n));
  base36_to_char(n)
}

pub fn is_base16(c: u8) -> bool {
  c.is_ascii_digit() || (b'a'..=b'f').contains(&c)
}

pub fn is_base36(c: u8) -> bool {
  c.is_ascii_digit() || c.is_ascii_lowercase()
}

/// Split `https://puzz.link/p?<kind>/<W>/<H>/<body>` into (height, width, body). Returns
/// `None` unless the URL has exactly this shape with positive dimensions.
pub fn split_url<'u>(url: &'u str, kind: &str) -> Option<(i32, i32, &'u str)> {
  let prefix = format!("https://puzz.link/p?{}/", kind);
  let rest = url.strip_prefix(prefix.as_str())?;

  let mut parts = rest.splitn(3, '/');
  let width: i32 = parts.next()?.parse().ok()?;
  let height: i32 = parts.next()?.parse().ok()?;
  let body = parts.next()?;
  if height <= 0 || width <= 0 {
    return None;
  }
  Some((height, width, body))
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base36_round_trip() {
    for n in 0..36 {
      assert_eq!(char_to_base36(base36_to_char(n) as u8), n);
    }
    assert!(is_base36(b'z'));
    assert!(is_base36(b'0'));
    assert!(!is_base36(b'-'));
    assert!(is_base16(b'f'));
    assert!(!is_base16(b'g'));
  }

  #[test]
  fn splits_well_formed_urls() {
    let (h, w, body) = split_url("https://puzz.link/p?dbchoco/6/4/abc/def", "dbchoco").unwrap();
    assert_eq!((h, w), (4, 6));
    assert_eq!(body, "abc/def");

    assert!(split_url("https://puzz.link/p?dbchoco/6/4", "dbchoco").is_none());
    assert!(split_url("https://puzz.link/p?evolmino/6/4/x", "dbchoco").is_none());
    assert!(split_url("https://puzz.link/p?dbchoco/0/4/x", "dbchoco").is_none());
    assert!(split_url("http://puzz.link/p?dbchoco/6/4/x", "dbchoco").is_none());
  }
}
