use super::{git_object::GitObject, Error, Result, Sha1Hash, SHA1_HEX_SIZE};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Loose object database under `.git/objects`.
///
/// Each object lives zlib-compressed at `<2 hex>/<38 hex>` of its hash.
/// Files are written to a temporary name in the bucket and renamed into
/// place, so readers only ever see complete objects. Existing objects are
/// never rewritten.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, hash: &Sha1Hash) -> PathBuf {
        let hex = hash.hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    pub fn contains(&self, hash: &Sha1Hash) -> bool {
        self.path(hash).is_file()
    }

    pub fn write(&self, object: &GitObject) -> Result<Sha1Hash> {
        let data = object.encode();
        let hash = Sha1Hash::digest(&data);
        let path = self.path(&hash);

        if path.exists() {
            debug!(%hash, "object already stored");
            return Ok(hash);
        }

        let dir = path
            .parent()
            .ok_or_else(|| Error::from("object path has no bucket directory"))?;
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        let mut e = ZlibEncoder::new(tmp, Compression::default());
        e.write_all(&data)?;
        let tmp = e.finish()?;
        tmp.persist(&path).map_err(|err| Error::Io(err.error))?;

        debug!(%hash, kind = %object.kind(), size = data.len(), "stored object");
        Ok(hash)
    }

    pub fn read(&self, hash: &Sha1Hash) -> Result<GitObject> {
        let f = fs::File::open(self.path(hash)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::ObjectNotFound(hash.hex()),
            _ => Error::Io(err),
        })?;

        let mut decoder = ZlibDecoder::new(f);
        let mut data = vec![];
        decoder
            .read_to_end(&mut data)
            .map_err(|err| Error::corrupt(format!("{hash}: cannot inflate. {err}")))?;

        GitObject::decode(&data).map_err(|err| match err {
            Error::CorruptObject(msg) => Error::CorruptObject(format!("{hash}: {msg}")),
            other => other,
        })
    }

    /// Every stored hash whose hex form starts with `prefix` (at least two
    /// lowercase hex characters).
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Sha1Hash>> {
        if prefix.len() < 2 || prefix.len() > SHA1_HEX_SIZE {
            return Err(Error::InvalidHash(format!("{prefix:?} is not a usable prefix")));
        }
        let (bucket, rest) = prefix.split_at(2);

        let entries = match fs::read_dir(self.root.join(bucket)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };

        let mut found = vec![];
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            // skips in-flight temp files
            if name.len() != SHA1_HEX_SIZE - 2 || !name.starts_with(rest) {
                continue;
            }
            if let Ok(hash) = Sha1Hash::from_hex(&format!("{bucket}{name}")) {
                found.push(hash);
            }
        }
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git_object::{Blob, ObjectKind};
    use tempfile::TempDir;

    fn store() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        (dir, store)
    }

    fn blob(content: &[u8]) -> GitObject {
        GitObject::from(Blob::from(content.to_vec()))
    }

    #[test]
    fn it_creates_filepath_from_sha1_hash() {
        let store = ObjectStore::new(".git/objects");
        let hash = Sha1Hash::from_hex("e88f7a929cd70b0274c4ea33b209c97fa845fdbc").unwrap();
        assert_eq!(
            store.path(&hash),
            PathBuf::from(".git/objects/e8/8f7a929cd70b0274c4ea33b209c97fa845fdbc")
        );
    }

    #[test]
    fn it_writes_and_reads_back() {
        let (_dir, store) = store();
        let obj = blob(b"hello\n");

        let hash = store.write(&obj).unwrap();
        assert_eq!(hash.hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(store.contains(&hash));

        let read = store.read(&hash).unwrap();
        assert_eq!(read, obj);
        assert_eq!(read.kind(), ObjectKind::Blob);
    }

    #[test]
    fn it_deduplicates_identical_content() {
        let (_dir, store) = store();
        let first = store.write(&blob(b"same")).unwrap();
        let second = store.write(&blob(b"same")).unwrap();
        assert_eq!(first, second);

        let bucket = store.path(&first).parent().unwrap().to_path_buf();
        assert_eq!(fs::read_dir(bucket).unwrap().count(), 1);
    }

    #[test]
    fn it_reports_missing_objects() {
        let (_dir, store) = store();
        let hash = Sha1Hash::from([0xaa; 20]);
        assert!(matches!(store.read(&hash), Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn it_reports_corrupt_objects() {
        let (_dir, store) = store();
        let hash = Sha1Hash::from([0xbb; 20]);
        let path = store.path(&hash);
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let mut e = ZlibEncoder::new(vec![], Compression::default());
        e.write_all(b"blob 99\0short").unwrap();
        fs::write(&path, e.finish().unwrap()).unwrap();
        assert!(matches!(store.read(&hash), Err(Error::CorruptObject(_))));

        fs::write(&path, b"not zlib at all").unwrap();
        assert!(matches!(store.read(&hash), Err(Error::CorruptObject(_))));
    }

    #[test]
    fn it_finds_objects_by_prefix() {
        let (_dir, store) = store();
        let hash = store.write(&blob(b"hello\n")).unwrap();
        let hex = hash.hex();

        assert_eq!(store.find_by_prefix(&hex[..6]).unwrap(), vec![hash]);
        assert_eq!(store.find_by_prefix(&hex).unwrap(), vec![hash]);
        assert!(store.find_by_prefix("0000").unwrap().is_empty());
    }
}
