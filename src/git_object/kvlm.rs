//! Header list plus free-text message, the body format shared by commits and
//! annotated tags.
//!
//! ```text
//! tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147
//! parent 206941306e8a8af65b66eaaaea388a7ae24d49a0
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL
//!  -----END PGP SIGNATURE-----
//!
//! Create first draft
//! ```
//!
//! A header value continues onto following lines that start with a single
//! space. The first empty line ends the headers; everything after it is the
//! message.

use super::{position, Error, Result};
use bytes::Bytes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    headers: Vec<(String, Vec<Bytes>)>,
    message: Bytes,
}

impl Kvlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header. A value for the same key as the last header joins
    /// that header's value list.
    pub fn push(&mut self, key: &str, value: impl Into<Bytes>) {
        let value = value.into();
        match self.headers.last_mut() {
            Some((last, values)) if last == key => values.push(value),
            _ => self.headers.push((key.to_string(), vec![value])),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Bytes>) -> Self {
        self.push(key, value);
        self
    }

    pub fn set_message(&mut self, message: impl Into<Bytes>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &Bytes {
        &self.message
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.get_all(key).next()
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Bytes> + 'a {
        let key = key.to_string();
        self.headers
            .iter()
            .filter(move |(k, _)| *k == key)
            .flat_map(|(_, values)| values.iter())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &[Bytes])> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut kvlm = Self::new();
        let mut start = 0;

        loop {
            let rest = &raw[start..];
            let nl = position(b'\n')(rest);
            let spc = position(b' ')(rest);

            // blank line: the message follows
            if nl == Some(0) {
                kvlm.message = Bytes::copy_from_slice(&rest[1..]);
                return Ok(kvlm);
            }

            let spc = match (spc, nl) {
                (Some(spc), Some(nl)) if spc < nl => spc,
                (_, None) => {
                    return Err(Error::corrupt(
                        "kvlm: headers are not followed by a blank line",
                    ))
                }
                _ => {
                    return Err(Error::corrupt(format!(
                        "kvlm: header line without a value at byte {start}"
                    )))
                }
            };

            let key = std::str::from_utf8(&rest[..spc])
                .map_err(|err| Error::corrupt(format!("kvlm: header key is not utf-8. {err}")))?;

            // the value ends at the first newline not followed by a space
            let mut end = spc;
            loop {
                end += 1 + position(b'\n')(&rest[end + 1..]).ok_or_else(|| {
                    Error::corrupt(format!("kvlm: unterminated value for {key:?}"))
                })?;
                if rest.get(end + 1) != Some(&b' ') {
                    break;
                }
            }

            kvlm.push(key, unindent(&rest[spc + 1..end]));
            start += end + 1;
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = vec![];
        for (key, values) in self.headers.iter() {
            for value in values {
                buf.extend_from_slice(key.as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(&indent(value));
                buf.push(b'\n');
            }
        }
        buf.push(b'\n');
        buf.extend_from_slice(&self.message);
        buf
    }
}

fn unindent(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    let mut iter = value.iter().peekable();
    while let Some(&byte) = iter.next() {
        out.push(byte);
        if byte == b'\n' && iter.peek() == Some(&&b' ') {
            iter.next();
        }
    }
    out
}

fn indent(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for &byte in value {
        out.push(byte);
        if byte == b'\n' {
            out.push(b' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED: &[u8] = concat!(
        "tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n",
        "parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n",
        "author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n",
        "committer Thibault Polge <thibault@thb.lt> 1527025044 +0200\n",
        "gpgsig -----BEGIN PGP SIGNATURE-----\n",
        " \n",
        " iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n",
        " kGQdcBAAqPP+ln4nGDd2gETXjvOpOxLzIMEw4A9gU6CzWzm+oB8mEIKyaH0UFIPh\n",
        " =lgTX\n",
        " -----END PGP SIGNATURE-----\n",
        "\n",
        "Create first draft",
    )
    .as_bytes();

    #[test]
    fn it_parses_headers_and_message() {
        let kvlm = Kvlm::parse(SIGNED).unwrap();
        assert_eq!(
            kvlm.get("tree").unwrap().as_ref(),
            b"29ff16c9c14e2652b22f8b78bb08a5a07930c147"
        );
        assert_eq!(kvlm.message().as_ref(), b"Create first draft");

        let sig = kvlm.get("gpgsig").unwrap();
        assert!(sig.starts_with(b"-----BEGIN PGP SIGNATURE-----\n\niQIz"));
        assert!(sig.ends_with(b"=lgTX\n-----END PGP SIGNATURE-----"));
    }

    #[test]
    fn it_round_trips_multiline_values() {
        let kvlm = Kvlm::parse(SIGNED).unwrap();
        assert_eq!(kvlm.serialize(), SIGNED);
    }

    #[test]
    fn it_accumulates_repeated_keys() {
        let raw = b"tree aaaa\nparent bbbb\nparent cccc\nauthor x\n\nmerge\n";
        let kvlm = Kvlm::parse(raw).unwrap();
        let parents: Vec<&[u8]> = kvlm.get_all("parent").map(|v| v.as_ref()).collect();
        assert_eq!(parents, vec![&b"bbbb"[..], &b"cccc"[..]]);
        assert_eq!(kvlm.headers().count(), 3);
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn it_returns_values_that_outlive_the_lookup_key() {
        let kvlm = Kvlm::parse(b"tree aaaa\nparent bbbb\n\nmsg\n").unwrap();
        let tree = {
            let key = String::from("tree");
            kvlm.get(&key)
        };
        let parents: Vec<&Bytes> = {
            let key = format!("par{}", "ent");
            kvlm.get_all(&key).collect()
        };
        assert_eq!(tree.unwrap().as_ref(), b"aaaa");
        assert_eq!(parents.len(), 1);
    }

    #[test]
    fn it_keeps_interleaved_keys_in_place() {
        let raw = b"a 1\nb 2\na 3\n\n";
        let kvlm = Kvlm::parse(raw).unwrap();
        let values: Vec<&[u8]> = kvlm.get_all("a").map(|v| v.as_ref()).collect();
        assert_eq!(values, vec![&b"1"[..], &b"3"[..]]);
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn it_accepts_empty_values_and_messages() {
        let raw = b"encoding \n\n";
        let kvlm = Kvlm::parse(raw).unwrap();
        assert_eq!(kvlm.get("encoding").unwrap().as_ref(), b"");
        assert!(kvlm.message().is_empty());
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn it_rejects_missing_separator() {
        assert!(matches!(
            Kvlm::parse(b"tree aaaa\n"),
            Err(Error::CorruptObject(_))
        ));
        assert!(matches!(
            Kvlm::parse(b"tree aaaa"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_rejects_header_without_value() {
        assert!(matches!(
            Kvlm::parse(b"tree\n\nmsg"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_builds_from_scratch() {
        let mut kvlm = Kvlm::new().with("object", "abc").with("type", "commit");
        kvlm.set_message("multi\nline\n");
        assert_eq!(
            kvlm.serialize(),
            b"object abc\ntype commit\n\nmulti\nline\n".to_vec()
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn header_key() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    fn header_value() -> impl Strategy<Value = Vec<u8>> {
        "[ -~]{0,20}(\n[ -~]{0,20}){0,3}".prop_map(String::into_bytes)
    }

    proptest! {
        /// Property: encode(decode(x)) == x
        #[test]
        fn prop_kvlm_round_trip(
            headers in prop::collection::vec((header_key(), header_value()), 0..8),
            message in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut kvlm = Kvlm::new();
            for (key, value) in headers {
                kvlm.push(&key, value);
            }
            kvlm.set_message(message);

            let raw = kvlm.serialize();
            let decoded = Kvlm::parse(&raw).unwrap();
            prop_assert_eq!(&decoded.serialize(), &raw);
            prop_assert_eq!(decoded, kvlm);
        }
    }
}
