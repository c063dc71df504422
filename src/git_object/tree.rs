use super::{position, Error, ObjectKind, Result, Sha1Hash, SHA1_HASH_SIZE};
use std::{cmp::Ordering, fmt};

pub const MODE_DIR: &str = "40000";
pub const MODE_FILE: &str = "100644";
pub const MODE_EXEC: &str = "100755";
pub const MODE_SYML: &str = "120000";
pub const MODE_GITLINK: &str = "160000";

/// Raw mode string of a tree entry, kept byte-for-byte as stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mode(String);

impl Mode {
    pub fn new(mode: &str) -> Result<Self> {
        if mode.is_empty() || mode.len() > 6 || !mode.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::corrupt(format!("tree: invalid mode {mode:?}")));
        }
        Ok(Self(mode.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Zero-padded to six digits, the way `ls-tree` prints it.
    pub fn padded(&self) -> String {
        format!("{:0>6}", self.0)
    }

    pub fn is_dir(&self) -> bool {
        self.padded() == "040000"
    }

    /// Kind of object an entry with this mode points at.
    pub fn kind(&self) -> Result<ObjectKind> {
        match &self.padded()[..2] {
            "04" => Ok(ObjectKind::Tree),
            "10" | "12" => Ok(ObjectKind::Blob),
            "16" => Ok(ObjectKind::Commit),
            _ => Err(Error::corrupt(format!("tree: unknown mode {}", self.0))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    mode: Mode,
    name: String,
    hash: Sha1Hash,
}

impl TreeEntry {
    pub fn new(mode: &str, name: &str, hash: Sha1Hash) -> Result<Self> {
        if name.is_empty() || name.contains('/') || name.contains('\0') {
            return Err(Error::corrupt(format!("tree: invalid entry name {name:?}")));
        }
        Ok(Self {
            mode: Mode::new(mode)?,
            name: name.to_string(),
            hash,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn hash(&self) -> Sha1Hash {
        self.hash
    }

    pub fn serialize(&self) -> Vec<u8> {
        let header = format!("{} {}\0", self.mode, self.name);
        [header.as_bytes(), self.hash.as_bytes()].concat()
    }

    // directories order as if their name ended with '/'
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.mode.is_dir() {
            key.push(b'/');
        }
        key
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.mode.0.cmp(&other.mode.0))
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self
            .mode
            .kind()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|_| "unknown".into());
        write!(
            f,
            "{} {} {}\t{}",
            self.mode.padded(),
            kind,
            self.hash.hex(),
            self.name,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree(Vec<TreeEntry>);

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self(entries)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        TreeRecords::new(bytes).collect::<Result<Vec<_>>>().map(Self)
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.0
    }

    /// Entries in canonical order.
    pub fn sorted(&self) -> Vec<TreeEntry> {
        let mut entries = self.0.clone();
        entries.sort();
        entries
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.sorted().iter().flat_map(TreeEntry::serialize).collect()
    }
}

impl From<Vec<TreeEntry>> for Tree {
    fn from(entries: Vec<TreeEntry>) -> Self {
        Self(entries)
    }
}

/// Walks `<mode> <name>\0<20-byte digest>` records in a tree payload.
#[derive(Debug)]
pub struct TreeRecords<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TreeRecords<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_entry(&mut self) -> Result<TreeEntry> {
        let buf = &self.bytes[self.pos..];

        let sp_pos = position(b' ')(buf)
            .ok_or_else(|| Error::corrupt(format!("tree: no mode separator at {}", self.pos)))?;
        let zero_pos = position(b'\0')(&buf[sp_pos..])
            .map(|p| p + sp_pos)
            .ok_or_else(|| Error::corrupt(format!("tree: no name terminator at {}", self.pos)))?;

        let digest = buf
            .get((zero_pos + 1)..(zero_pos + 1 + SHA1_HASH_SIZE))
            .ok_or_else(|| Error::corrupt(format!("tree: truncated digest at {}", self.pos)))?;

        let mode = std::str::from_utf8(&buf[..sp_pos])
            .map_err(|err| Error::corrupt(format!("tree: mode is not ascii. {err}")))?;
        let name = std::str::from_utf8(&buf[(sp_pos + 1)..zero_pos])
            .map_err(|err| Error::corrupt(format!("tree: name is not utf-8. {err}")))?;
        let entry = TreeEntry::new(mode, name, Sha1Hash::try_from(digest)?)?;

        self.pos += zero_pos + 1 + SHA1_HASH_SIZE;
        Ok(entry)
    }
}

impl Iterator for TreeRecords<'_> {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }

        let entry = self.read_entry();
        if entry.is_err() {
            // stop after the first malformed record
            self.pos = self.bytes.len();
        }
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_file_entry() {
        let bytes = b"100644 file1\x0011111111111111111111";
        let entry = TreeRecords::new(bytes).next().unwrap().unwrap();
        let expected = TreeEntry {
            mode: Mode(MODE_FILE.into()),
            name: "file1".into(),
            hash: [b'1'; 20].into(),
        };
        assert_eq!(entry, expected);
        assert_eq!(entry.mode().kind().unwrap(), ObjectKind::Blob);
    }

    #[test]
    fn it_creates_dir_entry() {
        let bytes = b"40000 dir1\x0099999999999999999999";
        let entry = TreeRecords::new(bytes).next().unwrap().unwrap();
        assert_eq!(entry.name(), "dir1");
        assert!(entry.mode().is_dir());
        assert_eq!(entry.mode().padded(), "040000");
        assert_eq!(entry.mode().kind().unwrap(), ObjectKind::Tree);
    }

    #[test]
    fn it_generates_entries_from_tree_records() {
        let bytes = b"100644 file1\x001111111111111111111140000 dir1\x0099999999999999999999";
        let tree = Tree::parse(bytes).unwrap();

        let names: Vec<&str> = tree.entries().iter().map(TreeEntry::name).collect();
        assert_eq!(names, vec!["file1", "dir1"]);
        assert_eq!(tree.entries()[1].hash(), Sha1Hash::from([b'9'; 20]));
    }

    #[test]
    fn it_sorts_directories_with_trailing_slash() {
        let hash = Sha1Hash::from([0u8; 20]);
        let tree = Tree::new(vec![
            TreeEntry::new(MODE_DIR, "foo", hash).unwrap(),
            TreeEntry::new(MODE_FILE, "foo.txt", hash).unwrap(),
            TreeEntry::new(MODE_FILE, "foo-bar", hash).unwrap(),
        ]);

        // '-' < '.' < '/'
        let names: Vec<String> = tree.sorted().iter().map(|e| e.name().into()).collect();
        assert_eq!(names, vec!["foo-bar", "foo.txt", "foo"]);

        let reparsed = Tree::parse(&tree.serialize()).unwrap();
        assert_eq!(reparsed.entries(), tree.sorted().as_slice());
    }

    #[test]
    fn it_rejects_truncated_digest() {
        let bytes = b"100644 file1\x00111";
        assert!(matches!(Tree::parse(bytes), Err(Error::CorruptObject(_))));
    }

    #[test]
    fn it_rejects_missing_separators() {
        assert!(matches!(
            Tree::parse(b"100644file1"),
            Err(Error::CorruptObject(_))
        ));
        assert!(matches!(
            Tree::parse(b"100644 file1"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_rejects_bad_modes_and_names() {
        let hash = Sha1Hash::from([0u8; 20]);
        assert!(TreeEntry::new("10x644", "a", hash).is_err());
        assert!(TreeEntry::new(MODE_FILE, "a/b", hash).is_err());
        assert!(TreeEntry::new(MODE_FILE, "", hash).is_err());
    }

    #[test]
    fn it_prints_like_ls_tree() {
        let entry = TreeEntry::new(MODE_DIR, "src", [0xab; 20].into()).unwrap();
        assert_eq!(
            entry.to_string(),
            format!("040000 tree {}\tsrc", "ab".repeat(20))
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entry() -> impl Strategy<Value = TreeEntry> {
        (
            prop::sample::select(vec![MODE_DIR, MODE_FILE, MODE_EXEC, MODE_SYML]),
            "[a-z0-9._-]{1,6}",
            any::<[u8; 20]>(),
        )
            .prop_map(|(mode, name, hash)| TreeEntry::new(mode, &name, hash.into()).unwrap())
    }

    proptest! {
        /// Property: decode(encode(tree)) is the tree in canonical order, and stays put
        #[test]
        fn prop_tree_normalization_is_idempotent(
            entries in prop::collection::vec(entry(), 0..12)
        ) {
            let tree = Tree::new(entries);
            let once = Tree::parse(&tree.serialize()).unwrap();
            let twice = Tree::parse(&once.serialize()).unwrap();

            let sorted = tree.sorted();
            prop_assert_eq!(once.entries(), sorted.as_slice());
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.serialize(), tree.serialize());
        }
    }
}
